use cp_common::SubmissionRecord;
use std::cmp::Ordering;
use tracing::debug;
use wasm_bindgen::prelude::*;
use web_sys::console;

// 导出模块
pub mod builder;
pub mod error;
pub mod models;

pub use builder::{FilterIndex, FilterIndexBuilder};
pub use error::{FilterError, Result};
pub use models::{
    FilterCriteria, FilterOptions, FilterParams, Page, PageState, SortDirection, SortField,
    SortSpec,
};

//===== 谓词 =====

/// 难度上下界：设置了界限时，未评级的题目不通过
fn passes_rating(record: &SubmissionRecord, criteria: &FilterCriteria) -> bool {
    if let Some(min) = criteria.min_rating {
        if !record.problem_rating.is_some_and(|r| r >= min) {
            return false;
        }
    }
    if let Some(max) = criteria.max_rating {
        if !record.problem_rating.is_some_and(|r| r <= max) {
            return false;
        }
    }
    true
}

fn passes_language(record: &SubmissionRecord, criteria: &FilterCriteria) -> bool {
    match criteria.language.as_deref() {
        Some(language) if !language.is_empty() => record.language == language,
        _ => true,
    }
}

fn passes_tags(record: &SubmissionRecord, criteria: &FilterCriteria) -> bool {
    criteria.tags.is_empty()
        || record
            .tags()
            .into_iter()
            .any(|tag| criteria.tags.contains(tag))
}

/// 筛选记录，保持原始相对顺序
pub fn filter_records<'a>(
    records: &'a [SubmissionRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a SubmissionRecord> {
    records
        .iter()
        .filter(|r| passes_rating(r, criteria) && passes_tags(r, criteria) && passes_language(r, criteria))
        .collect()
}

//===== 排序 =====

/// 不区分大小写的字典序比较
fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// 题目ID按数值比较：先比较前导数字（比赛ID），再比较剩余部分。
/// 数字串按去掉前导零后的长度、再按字典序比较，任意长度都不会溢出；
/// 没有前导数字的ID排在最前
fn cmp_problem_id(a: &str, b: &str) -> Ordering {
    fn split(id: &str) -> (&str, &str) {
        let digits = id.len() - id.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        id.split_at(digits)
    }

    let (digits_a, rest_a) = split(a);
    let (digits_b, rest_b) = split(b);
    let num_a = digits_a.trim_start_matches('0');
    let num_b = digits_b.trim_start_matches('0');

    (!digits_a.is_empty())
        .cmp(&!digits_b.is_empty())
        .then_with(|| num_a.len().cmp(&num_b.len()))
        .then_with(|| num_a.cmp(num_b))
        .then_with(|| rest_a.cmp(rest_b))
}

/// 未评级映射为正无穷（升序）或负无穷（降序），始终排在末尾
fn rating_key(record: &SubmissionRecord, direction: SortDirection) -> i64 {
    match (record.problem_rating, direction) {
        (Some(r), _) => i64::from(r),
        (None, SortDirection::Asc) => i64::MAX,
        (None, SortDirection::Desc) => i64::MIN,
    }
}

/// 按排序规则比较两条记录，相等时返回 Equal 以便稳定排序保留原顺序
pub fn compare_records(a: &SubmissionRecord, b: &SubmissionRecord, spec: &SortSpec) -> Ordering {
    let ordering = match spec.field {
        SortField::CreationTimeSeconds => a.creation_time_seconds.cmp(&b.creation_time_seconds),
        SortField::ProblemRating => {
            rating_key(a, spec.direction).cmp(&rating_key(b, spec.direction))
        }
        SortField::ProblemId => cmp_problem_id(&a.problem_id, &b.problem_id),
        SortField::ProblemName => cmp_ignore_case(
            a.problem_name.as_deref().unwrap_or(""),
            b.problem_name.as_deref().unwrap_or(""),
        ),
        SortField::Language => cmp_ignore_case(&a.language, &b.language),
    };

    match spec.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// 稳定排序
pub fn sort_records(records: &mut [&SubmissionRecord], spec: &SortSpec) {
    records.sort_by(|a, b| compare_records(a, b, spec));
}

//===== 分页 =====

/// 总页数，空集合为0页
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// 截取当前页，超出范围时返回空页
pub fn paginate<T: Clone>(items: &[T], state: &PageState) -> Page<T> {
    let page_size = state.page_size.max(1);
    let total = items.len();
    let start = state.current_page.saturating_sub(1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);

    Page {
        items: items[start..end].to_vec(),
        total,
        page: state.current_page,
        page_size,
        total_pages: total_pages(total, page_size),
    }
}

/// 校验目标页码，不在 [1, total_pages] 内时拒绝
pub fn check_page(requested: usize, total_pages: usize) -> Result<()> {
    if requested == 0 || requested > total_pages {
        return Err(FilterError::PageOutOfRange {
            requested,
            total_pages,
        });
    }
    Ok(())
}

/// 提交筛选器 - 持有完整记录集合及其标签索引
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    records: Vec<SubmissionRecord>,
    index: FilterIndex,
}

impl SubmissionFilter {
    pub fn new(records: Vec<SubmissionRecord>) -> Self {
        let index = FilterIndex::from_records(&records);
        Self { records, index }
    }

    pub fn records(&self) -> &[SubmissionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 获取筛选控件的可选值
    pub fn options(&self) -> FilterOptions {
        self.index.options()
    }

    /// 应用筛选条件，返回按原始顺序排列的记录下标
    pub fn apply_filters(&self, criteria: &FilterCriteria) -> Vec<usize> {
        // 标签条件通过索引求并集，其余条件逐条判断
        let candidates: Vec<usize> = if criteria.tags.is_empty() {
            (0..self.records.len()).collect()
        } else {
            self.index.candidates_for_tags(&criteria.tags).into_iter().collect()
        };

        candidates
            .into_iter()
            .filter(|&id| {
                let record = &self.records[id];
                passes_rating(record, criteria) && passes_language(record, criteria)
            })
            .collect()
    }

    /// 按排序规则稳定排序记录下标
    pub fn apply_sorting(&self, ids: &mut [usize], spec: &SortSpec) {
        ids.sort_by(|&a, &b| compare_records(&self.records[a], &self.records[b], spec));
    }

    /// 筛选并排序
    pub fn ordered_ids(&self, criteria: &FilterCriteria, spec: &SortSpec) -> Vec<usize> {
        let mut ids = self.apply_filters(criteria);
        self.apply_sorting(&mut ids, spec);
        debug!(
            total = self.records.len(),
            matched = ids.len(),
            field = ?spec.field,
            direction = ?spec.direction,
            "筛选排序完成"
        );
        ids
    }

    /// 取出某一页的记录
    pub fn page_of(&self, ordered: &[usize], state: &PageState) -> Page<SubmissionRecord> {
        let page = paginate(ordered, state);
        Page {
            items: page
                .items
                .into_iter()
                .filter_map(|id| self.records.get(id).cloned())
                .collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        }
    }

    /// 筛选、排序并分页
    pub fn filter_submissions(&self, params: &FilterParams, page_size: usize) -> Page<SubmissionRecord> {
        let ordered = self.ordered_ids(&params.criteria, &params.sort_spec());
        let mut state = PageState::new(page_size);
        state.current_page = params.page.unwrap_or(1).max(1);
        self.page_of(&ordered, &state)
    }
}

/// 提交筛选器JS接口 - 提供给JavaScript使用的筛选API
#[wasm_bindgen]
pub struct SubmissionFilterJS {
    inner: SubmissionFilter,
    page_size: usize,
}

#[wasm_bindgen]
impl SubmissionFilterJS {
    /// 以提交记录JSON数组初始化筛选器
    #[wasm_bindgen(constructor)]
    pub fn new(records_json: &str, page_size: usize) -> std::result::Result<SubmissionFilterJS, JsValue> {
        console_error_panic_hook::set_once();

        let records: Vec<SubmissionRecord> = serde_json::from_str(records_json).map_err(|e| {
            let message = format!("解析提交记录失败: {}", e);
            console::log_1(&JsValue::from_str(&message));
            JsValue::from_str(&message)
        })?;

        Ok(SubmissionFilterJS {
            inner: SubmissionFilter::new(records),
            page_size: page_size.max(1),
        })
    }

    /// 获取筛选选项
    #[wasm_bindgen]
    pub fn get_options(&self) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.options())
            .map_err(|e| JsValue::from_str(&format!("序列化筛选选项失败: {}", e)))
    }

    /// 筛选提交
    #[wasm_bindgen]
    pub fn filter_submissions(&self, params_json: &str) -> std::result::Result<JsValue, JsValue> {
        // 解析参数
        let params: FilterParams = serde_json::from_str(params_json)
            .map_err(|e| JsValue::from_str(&format!("解析参数失败: {}", e)))?;

        let result = self.inner.filter_submissions(&params, self.page_size);

        // 序列化结果
        serde_wasm_bindgen::to_value(&result)
            .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
    }
}
