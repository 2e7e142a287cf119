//! 仪表盘状态容器
//!
//! 原始记录集合只能通过 [`Dashboard::replace_collection`] 整体替换，
//! 替换时筛选、排序、分页、年份选择和聚合结果一并重建。

use chrono::FixedOffset;
use cp_common::{CommonError, DashboardConfig, SubmissionRecord};
use serde::Serialize;
use submission_filter::{
    check_page, total_pages, FilterCriteria, FilterOptions, PageState, SortSpec, SubmissionFilter,
};
use submission_stats::{
    weekly_dataset, Aggregates, Clock, Debouncer, EmphasisParams, GeometrySnapshot, SystemClock,
    TimerHandle, YearScroller, YearSelector,
};
use tracing::{debug, info, warn};

use crate::error::{DashboardError, Result};
use crate::view::{DashboardCharts, EmptyState, ListView, SubmissionCard, YearView};

/// 请求票据，用于丢弃过期的响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(pub u32);

/// 请求完成后的结果
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// 成功加载了若干条记录
    Loaded { count: usize },
    /// 请求成功但没有记录
    Empty,
    /// 数据源失败，状态已清空
    Failed { message: String },
    /// 已有更新的请求，响应被忽略
    Stale,
}

/// 仪表盘
pub struct Dashboard<C: Clock = SystemClock> {
    config: DashboardConfig,
    offset: FixedOffset,
    filter: SubmissionFilter,
    criteria: FilterCriteria,
    sort: SortSpec,
    page: PageState,
    /// 筛选排序后的记录下标
    ordered: Vec<usize>,
    aggregates: Aggregates,
    years: YearSelector<C>,
    latest_ticket: u32,
    loading: bool,
    error: Option<String>,
}

impl Dashboard<SystemClock> {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Dashboard<C> {
    pub fn with_clock(config: DashboardConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let offset = config.offset()?;
        let params = EmphasisParams {
            min_opacity: config.min_opacity,
            distance_divisor: config.visible_distance_divisor,
        };
        let years = YearSelector::new(offset, params, Debouncer::new(clock, config.debounce_ms));

        Ok(Self {
            offset,
            filter: SubmissionFilter::default(),
            criteria: FilterCriteria::default(),
            sort: SortSpec::default(),
            page: PageState::new(config.page_size),
            ordered: Vec::new(),
            aggregates: Aggregates::compute(&[], config.top_tags),
            years,
            latest_ticket: 0,
            loading: false,
            error: None,
            config,
        })
    }

    //===== 请求生命周期 =====

    /// 开始一次请求。用户名为空时清空现有状态并拒绝，不发起请求
    pub fn begin_fetch(&mut self, handle: &str) -> Result<FetchTicket> {
        if handle.trim().is_empty() {
            let err = DashboardError::EmptyHandle;
            self.clear();
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.latest_ticket = self.latest_ticket.wrapping_add(1);
        self.loading = true;
        self.error = None;
        debug!(ticket = self.latest_ticket, handle = handle.trim(), "开始请求");
        Ok(FetchTicket(self.latest_ticket))
    }

    /// 请求结束。只有最新票据的响应会生效
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: std::result::Result<Vec<SubmissionRecord>, CommonError>,
        scroller: &mut impl YearScroller,
    ) -> FetchOutcome {
        if ticket.0 != self.latest_ticket {
            warn!(ticket = ticket.0, latest = self.latest_ticket, "忽略过期的响应");
            return FetchOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(records) if records.is_empty() => {
                self.replace_collection(records, scroller);
                FetchOutcome::Empty
            }
            Ok(records) => {
                let count = records.len();
                self.replace_collection(records, scroller);
                FetchOutcome::Loaded { count }
            }
            Err(err) => {
                let message = err.to_string();
                warn!(error = %message, "请求失败，清空状态");
                self.replace_collection(Vec::new(), scroller);
                self.error = Some(message.clone());
                FetchOutcome::Failed { message }
            }
        }
    }

    /// 整体替换原始记录，并重建所有派生状态；年份选择器随即居中并强调选中年份
    pub fn replace_collection(&mut self, records: Vec<SubmissionRecord>, scroller: &mut impl YearScroller) {
        let filter = SubmissionFilter::new(records);
        let criteria = FilterCriteria::default();
        let sort = SortSpec::default();
        let ordered = filter.ordered_ids(&criteria, &sort);
        let aggregates = Aggregates::compute(filter.records(), self.config.top_tags);

        self.years.set_collection(filter.records(), scroller);
        self.filter = filter;
        self.criteria = criteria;
        self.sort = sort;
        self.ordered = ordered;
        self.aggregates = aggregates;
        self.page = PageState::new(self.config.page_size);
        self.error = None;

        info!(
            records = self.filter.records().len(),
            years = self.years.available_years().len(),
            "记录集合已替换"
        );
    }

    /// 清空为初始状态
    pub fn clear(&mut self) {
        self.replace_collection(Vec::new(), &mut GeometrySnapshot::default());
        self.loading = false;
    }

    //===== 筛选、排序、分页 =====

    fn rerun_pipeline(&mut self) {
        self.ordered = self.filter.ordered_ids(&self.criteria, &self.sort);
        self.page.current_page = 1;
    }

    /// 同时更新筛选条件与排序规则，页码回到1
    pub fn apply(&mut self, criteria: FilterCriteria, sort: SortSpec) {
        self.criteria = criteria;
        self.sort = sort;
        self.rerun_pipeline();
    }

    pub fn set_filters(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.rerun_pipeline();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.rerun_pipeline();
    }

    /// 恢复默认筛选条件与排序
    pub fn reset_filters(&mut self) {
        self.apply(FilterCriteria::default(), SortSpec::default());
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.ordered.len(), self.page.page_size)
    }

    /// 跳转页码，超出 [1, total_pages] 时拒绝
    pub fn go_to_page(&mut self, page: usize) -> Result<()> {
        check_page(page, self.total_pages())?;
        self.page.current_page = page;
        Ok(())
    }

    pub fn next_page(&mut self) -> Result<()> {
        self.go_to_page(self.page.current_page + 1)
    }

    pub fn previous_page(&mut self) -> Result<()> {
        self.go_to_page(self.page.current_page.saturating_sub(1))
    }

    //===== 年份选择器 =====

    /// 选中年份；不在可选列表中时状态不变并返回错误
    pub fn select_year(&mut self, year: i32, scroller: &mut impl YearScroller) -> Result<()> {
        if self.years.select_year(year, self.filter.records(), scroller) {
            Ok(())
        } else {
            Err(DashboardError::UnknownYear(year))
        }
    }

    pub fn on_scroll(&mut self) -> TimerHandle {
        self.years.on_scroll()
    }

    pub fn on_timer(&mut self, handle: TimerHandle, scroller: &mut impl YearScroller) -> bool {
        self.years.on_timer(handle, scroller)
    }

    //===== 读取 =====

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn records(&self) -> &[SubmissionRecord] {
        self.filter.records()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page_state(&self) -> &PageState {
        &self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn filter_options(&self) -> FilterOptions {
        self.filter.options()
    }

    pub fn year_selector(&self) -> &YearSelector<C> {
        &self.years
    }

    /// 当前页的列表视图
    pub fn list_view(&self) -> ListView {
        let page = self.filter.page_of(&self.ordered, &self.page);
        let items: Vec<SubmissionCard> = page
            .items
            .iter()
            .map(|record| SubmissionCard::from_record(record, &self.offset))
            .collect();

        let empty_state = if !items.is_empty() {
            None
        } else if self.filter.is_empty() {
            Some(EmptyState::NoSolvedProblems)
        } else {
            Some(EmptyState::NoMatchingProblems)
        };

        ListView {
            items,
            total: page.total,
            page: page.page,
            total_pages: page.total_pages,
            has_previous: page.page > 1,
            has_next: page.page < page.total_pages,
            empty_state,
            empty_message: empty_state.map(|s| s.message()),
        }
    }

    /// 四个图表的数据集
    pub fn charts(&self) -> DashboardCharts {
        DashboardCharts {
            weekly: weekly_dataset(self.years.selected_year(), self.years.weekly_series()),
            ratings: self.aggregates.rating_dataset(),
            languages: self.aggregates.language_dataset(),
            tags: self.aggregates.tag_dataset(),
        }
    }

    pub fn year_view(&self) -> YearView {
        YearView {
            available_years: self.years.available_years().to_vec(),
            selected_year: self.years.selected_year(),
            selected_display: self.years.selected_year_display(),
            focused_year: self.years.focused_year(),
            emphasis: self.years.emphasis().to_vec(),
        }
    }
}
