//! 年份滚动条的视觉强调计算
//!
//! 所有坐标都使用滚动容器的内容坐标系：视口由 `scroll_top` 和 `height` 描述，
//! 每一项由其 `offset_top` 和 `height` 描述。

use serde::{Deserialize, Serialize};

/// 滚动视口
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportGeometry {
    /// 当前滚动位置
    pub scroll_top: f64,
    /// 视口可见高度
    pub height: f64,
}

impl ViewportGeometry {
    pub fn center(&self) -> f64 {
        self.scroll_top + self.height / 2.0
    }
}

/// 列表项位置
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemPosition {
    /// 相对内容顶部的偏移
    pub offset_top: f64,
    pub height: f64,
}

impl ItemPosition {
    pub fn center(&self) -> f64 {
        self.offset_top + self.height / 2.0
    }
}

/// 强调参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmphasisParams {
    /// 不透明度下限
    pub min_opacity: f64,
    /// 最大可见距离 = 视口半高 / divisor
    pub distance_divisor: f64,
}

impl Default for EmphasisParams {
    fn default() -> Self {
        Self {
            min_opacity: 0.1,
            distance_divisor: 2.5,
        }
    }
}

/// 单项强调结果
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ItemEmphasis {
    pub index: usize,
    /// 与视口中心的距离
    pub distance: f64,
    pub opacity: f64,
    /// 距离中心最近的一项
    pub focused: bool,
}

/// 根据几何位置计算每一项的不透明度，最近的一项强制为1并标记为焦点
pub fn compute_emphasis(
    viewport: &ViewportGeometry,
    items: &[ItemPosition],
    params: &EmphasisParams,
) -> Vec<ItemEmphasis> {
    let center = viewport.center();
    let max_visible = (viewport.height / 2.0) / params.distance_divisor;

    let mut result: Vec<ItemEmphasis> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let distance = (center - item.center()).abs();
            let opacity = if max_visible > 0.0 {
                (1.0 - distance / max_visible).clamp(params.min_opacity, 1.0)
            } else if distance == 0.0 {
                1.0
            } else {
                params.min_opacity
            };
            ItemEmphasis {
                index,
                distance,
                opacity,
                focused: false,
            }
        })
        .collect();

    // 距离相同时取靠前的一项
    let nearest = result
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |best, (i, e)| match best {
            Some((_, d)) if d <= e.distance => best,
            _ => Some((i, e.distance)),
        });

    if let Some((i, _)) = nearest {
        result[i].opacity = 1.0;
        result[i].focused = true;
    }

    result
}

/// 将某一项滚动到视口中央所需的滚动位置
pub fn scroll_target(viewport: &ViewportGeometry, item: &ItemPosition) -> f64 {
    (item.offset_top - viewport.height / 2.0 + item.height / 2.0).max(0.0)
}
