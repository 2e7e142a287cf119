//! 年份选择器状态机
//!
//! `Uninitialized -> Populated(available_years, selected_year)`。
//! 选中年份时重新计算周统计，并通知外部滚动控件将该年份滚动到中央；
//! 滚动事件经防抖后重新计算各项的强调效果。

use chrono::FixedOffset;
use cp_common::time::year_of;
use cp_common::SubmissionRecord;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::aggregation::weekly_series;
use crate::debounce::{Clock, Debouncer, SystemClock, TimerHandle};
use crate::emphasis::{compute_emphasis, scroll_target, EmphasisParams, ItemEmphasis, ItemPosition, ViewportGeometry};
use crate::models::WeeklyBucket;

/// 年份滚动控件 - 由渲染层实现
pub trait YearScroller {
    /// 视口与各年份项的当前几何位置，顺序与 `available_years` 一致
    fn geometry(&self) -> (ViewportGeometry, Vec<ItemPosition>);
    /// 滚动到指定位置
    fn scroll_to(&mut self, scroll_top: f64);
    /// 应用不透明度与焦点
    fn apply_emphasis(&mut self, emphasis: &[ItemEmphasis]);
}

/// 几何快照 - 记录滚动请求与强调结果，供无渲染环境（wasm 接口、测试）使用
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySnapshot {
    pub viewport: ViewportGeometry,
    pub items: Vec<ItemPosition>,
    /// 最近一次滚动请求
    pub scrolled_to: Option<f64>,
    pub emphasis: Vec<ItemEmphasis>,
}

impl GeometrySnapshot {
    pub fn new(viewport: ViewportGeometry, items: Vec<ItemPosition>) -> Self {
        Self {
            viewport,
            items,
            scrolled_to: None,
            emphasis: Vec::new(),
        }
    }
}

impl YearScroller for GeometrySnapshot {
    fn geometry(&self) -> (ViewportGeometry, Vec<ItemPosition>) {
        (self.viewport, self.items.clone())
    }

    fn scroll_to(&mut self, scroll_top: f64) {
        self.viewport.scroll_top = scroll_top;
        self.scrolled_to = Some(scroll_top);
    }

    fn apply_emphasis(&mut self, emphasis: &[ItemEmphasis]) {
        self.emphasis = emphasis.to_vec();
    }
}

/// 选择器状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectorState {
    #[default]
    Uninitialized,
    Populated {
        /// 降序、去重的年份
        available_years: Vec<i32>,
        selected_year: i32,
    },
}

/// 年份选择器
pub struct YearSelector<C: Clock = SystemClock> {
    state: SelectorState,
    offset: FixedOffset,
    params: EmphasisParams,
    weekly: Vec<WeeklyBucket>,
    emphasis: Vec<ItemEmphasis>,
    debouncer: Debouncer<C>,
}

/// 记录集合中出现过的年份，降序去重
pub fn available_years(records: &[SubmissionRecord], offset: &FixedOffset) -> Vec<i32> {
    let years: BTreeSet<i32> = records
        .iter()
        .filter_map(|r| year_of(r.creation_time_seconds, offset))
        .collect();
    years.into_iter().rev().collect()
}

impl<C: Clock> YearSelector<C> {
    pub fn new(offset: FixedOffset, params: EmphasisParams, debouncer: Debouncer<C>) -> Self {
        Self {
            state: SelectorState::Uninitialized,
            offset,
            params,
            weekly: Vec::new(),
            emphasis: Vec::new(),
            debouncer,
        }
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn available_years(&self) -> &[i32] {
        match &self.state {
            SelectorState::Populated { available_years, .. } => available_years,
            SelectorState::Uninitialized => &[],
        }
    }

    pub fn selected_year(&self) -> Option<i32> {
        match &self.state {
            SelectorState::Populated { selected_year, .. } => Some(*selected_year),
            SelectorState::Uninitialized => None,
        }
    }

    /// 选中年份的展示文本
    pub fn selected_year_display(&self) -> String {
        self.selected_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// 选中年份的周统计
    pub fn weekly_series(&self) -> &[WeeklyBucket] {
        &self.weekly
    }

    pub fn emphasis(&self) -> &[ItemEmphasis] {
        &self.emphasis
    }

    /// 当前位于视口中央的年份
    pub fn focused_year(&self) -> Option<i32> {
        self.emphasis
            .iter()
            .find(|e| e.focused)
            .and_then(|e| self.available_years().get(e.index).copied())
    }

    pub fn debouncer(&self) -> &Debouncer<C> {
        &self.debouncer
    }

    /// 用新的记录集合重建年份列表，原选中年份仍存在时保留，否则选中最近一年；
    /// 随后把选中年份滚动到中央并重新计算强调效果
    pub fn set_collection(&mut self, records: &[SubmissionRecord], scroller: &mut impl YearScroller) {
        let years = available_years(records, &self.offset);
        self.emphasis.clear();
        self.debouncer.cancel();

        let Some(&latest) = years.first() else {
            self.state = SelectorState::Uninitialized;
            self.weekly.clear();
            scroller.apply_emphasis(&self.emphasis);
            return;
        };

        let selected = self
            .selected_year()
            .filter(|year| years.contains(year))
            .unwrap_or(latest);

        debug!(years = ?years, selected, "年份列表已更新");
        self.state = SelectorState::Populated {
            available_years: years,
            selected_year: selected,
        };
        self.weekly = weekly_series(records, selected, &self.offset);
        self.center_selected(scroller);
    }

    /// 选中年份，不在列表中时忽略并返回 false
    pub fn select_year(
        &mut self,
        year: i32,
        records: &[SubmissionRecord],
        scroller: &mut impl YearScroller,
    ) -> bool {
        let SelectorState::Populated {
            available_years,
            selected_year,
        } = &mut self.state
        else {
            warn!(year, "年份选择器尚未初始化，忽略选择");
            return false;
        };

        if !available_years.contains(&year) {
            warn!(year, "年份不在可选列表中，忽略选择");
            return false;
        }

        *selected_year = year;
        self.weekly = weekly_series(records, year, &self.offset);
        self.center_selected(scroller);
        true
    }

    /// 将选中年份滚动到视口中央，并立即重新计算强调效果
    fn center_selected(&mut self, scroller: &mut impl YearScroller) {
        let position = self
            .selected_year()
            .and_then(|year| self.available_years().iter().position(|&y| y == year));

        let (viewport, items) = scroller.geometry();
        if let Some(item) = position.and_then(|p| items.get(p)) {
            scroller.scroll_to(scroll_target(&viewport, item));
        }
        self.refresh_emphasis(scroller);
    }

    /// 滚动事件：重新调度强调计算
    pub fn on_scroll(&mut self) -> TimerHandle {
        self.debouncer.schedule()
    }

    /// 防抖定时器到期回调，句柄已被取代或未到期时不执行
    pub fn on_timer(&mut self, handle: TimerHandle, scroller: &mut impl YearScroller) -> bool {
        if !self.debouncer.fire(handle) {
            return false;
        }
        self.refresh_emphasis(scroller);
        true
    }

    /// 立即重新计算并应用强调效果
    pub fn refresh_emphasis(&mut self, scroller: &mut impl YearScroller) {
        let (viewport, items) = scroller.geometry();
        self.emphasis = compute_emphasis(&viewport, &items, &self.params);
        scroller.apply_emphasis(&self.emphasis);
    }
}
