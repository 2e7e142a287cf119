//! 渲染层使用的视图模型

use chrono::FixedOffset;
use cp_common::time::format_date;
use cp_common::{RatingTier, SubmissionRecord};
use serde::Serialize;
use submission_stats::{ChartDataset, ItemEmphasis};

/// 列表为空时的提示类型
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmptyState {
    /// 没有任何记录
    NoSolvedProblems,
    /// 有记录但都被筛选条件排除
    NoMatchingProblems,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoSolvedProblems => {
                "No solved problems found for this user. Try a different Codeforces handle."
            }
            EmptyState::NoMatchingProblems => {
                "No problems match your current filters. Try adjusting your filter criteria."
            }
        }
    }
}

/// 提交卡片
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SubmissionCard {
    pub problem_id: String,
    pub name: String,
    /// 题目外部链接
    pub url: Option<String>,
    pub rating: String,
    pub tier: RatingTier,
    pub language: String,
    /// YYYY-MM-DD
    pub date: String,
    pub tags: Vec<String>,
}

impl SubmissionCard {
    pub fn from_record(record: &SubmissionRecord, offset: &FixedOffset) -> Self {
        Self {
            problem_id: record.problem_id.clone(),
            name: record.display_name().to_string(),
            url: record.problem_url(),
            rating: record
                .problem_rating
                .map(|r| r.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            tier: record.rating_tier(),
            language: if record.language.is_empty() {
                "N/A".to_string()
            } else {
                record.language.clone()
            },
            date: format_date(record.creation_time_seconds, offset).unwrap_or_else(|| "N/A".to_string()),
            tags: record.tags().into_iter().map(str::to_string).collect(),
        }
    }
}

/// 列表视图
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ListView {
    pub items: Vec<SubmissionCard>,
    /// 筛选结果总数
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub empty_state: Option<EmptyState>,
    /// 空列表提示文本
    pub empty_message: Option<&'static str>,
}

/// 四个图表的数据集
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DashboardCharts {
    pub weekly: ChartDataset,
    pub ratings: ChartDataset,
    pub languages: ChartDataset,
    pub tags: ChartDataset,
}

/// 年份选择器视图
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct YearView {
    pub available_years: Vec<i32>,
    pub selected_year: Option<i32>,
    pub selected_display: String,
    pub focused_year: Option<i32>,
    pub emphasis: Vec<ItemEmphasis>,
}
