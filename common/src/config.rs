use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::{CommonError, Result};

/// 仪表盘配置 - 所有字段均有默认值
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// 每页条数
    pub page_size: usize,
    /// 滚动强调的防抖间隔（毫秒）
    pub debounce_ms: u64,
    /// 标签频率图保留的条数
    pub top_tags: usize,
    /// 最低不透明度
    pub min_opacity: f64,
    /// 最大可见距离 = 视口半高 / 该除数
    pub visible_distance_divisor: f64,
    /// 计算日期所用的时区偏移（分钟，东为正）
    pub utc_offset_minutes: i32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            debounce_ms: 150,
            top_tags: 15,
            min_opacity: 0.1,
            visible_distance_divisor: 2.5,
            utc_offset_minutes: 0,
        }
    }
}

impl DashboardConfig {
    /// 从JSON解析配置，空字符串使用默认值
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = if json.trim().is_empty() {
            Self::default()
        } else {
            serde_json::from_str(json)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(CommonError::InvalidConfig("page_size 必须大于0".to_string()));
        }
        if self.top_tags == 0 {
            return Err(CommonError::InvalidConfig("top_tags 必须大于0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.min_opacity) {
            return Err(CommonError::InvalidConfig(format!(
                "min_opacity 超出范围: {}",
                self.min_opacity
            )));
        }
        if !(self.visible_distance_divisor > 0.0) {
            return Err(CommonError::InvalidConfig(format!(
                "visible_distance_divisor 必须为正数: {}",
                self.visible_distance_divisor
            )));
        }
        self.offset().map(|_| ())
    }

    /// 时区偏移
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                CommonError::InvalidConfig(format!(
                    "utc_offset_minutes 超出范围: {}",
                    self.utc_offset_minutes
                ))
            })
    }
}
