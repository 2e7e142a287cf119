use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// 筛选条件 - 各类别之间为AND，标签内部为OR
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FilterCriteria {
    /// 最低难度（含）
    pub min_rating: Option<i32>,
    /// 最高难度（含）
    pub max_rating: Option<i32>,
    /// 选中的标签，命中任意一个即通过
    pub tags: BTreeSet<String>,
    /// 选中的语言，精确匹配
    pub language: Option<String>,
}

impl FilterCriteria {
    /// 没有任何生效的条件
    pub fn is_empty(&self) -> bool {
        self.min_rating.is_none()
            && self.max_rating.is_none()
            && self.tags.is_empty()
            && self.language.as_deref().map_or(true, str::is_empty)
    }
}

/// 排序字段
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreationTimeSeconds,
    ProblemRating,
    ProblemName,
    ProblemId,
    Language,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "creation_time_seconds" | "time" => Ok(SortField::CreationTimeSeconds),
            "problem_rating" | "rating" => Ok(SortField::ProblemRating),
            "problem_name" | "name" => Ok(SortField::ProblemName),
            "problem_id" | "id" => Ok(SortField::ProblemId),
            "language" => Ok(SortField::Language),
            _ => Err(format!("未知的排序字段: {}", s)),
        }
    }
}

/// 排序方向
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("未知的排序方向: {}", s)),
        }
    }
}

/// 排序规则，默认按提交时间倒序
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// 分页状态
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    /// 每页条数
    pub page_size: usize,
    /// 当前页码，从1开始
    pub current_page: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }
}

/// 分页结果
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// 当前页的条目
    pub items: Vec<T>,
    /// 筛选结果总数
    pub total: usize,
    /// 当前页码
    pub page: usize,
    /// 每页条数
    pub page_size: usize,
    /// 总页数
    pub total_pages: usize,
}

/// 筛选选项 - 供筛选控件使用的标签和语言列表
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub tags: Vec<String>,
    pub languages: Vec<String>,
}

/// 筛选参数 - 客户端以JSON传递
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct FilterParams {
    #[serde(flatten)]
    pub criteria: FilterCriteria,
    /// 排序字段 (可选, 默认为提交时间)
    pub sort_by: Option<SortField>,
    /// 排序方向 (可选, 默认为倒序)
    pub order: Option<SortDirection>,
    /// 分页 - 当前页码 (可选, 默认为1)
    pub page: Option<usize>,
}

impl FilterParams {
    pub fn sort_spec(&self) -> SortSpec {
        SortSpec {
            field: self.sort_by.unwrap_or_default(),
            direction: self.order.unwrap_or_default(),
        }
    }
}
