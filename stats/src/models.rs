use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 图表类型
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    HorizontalBar,
}

/// 图表数据集 - 交给图表库渲染的 {labels, values}
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChartDataset {
    /// 图表类型
    pub kind: ChartKind,
    /// 数据序列标题
    pub title: String,
    /// 横轴标签
    pub labels: Vec<String>,
    /// 数值，与标签一一对应
    pub values: Vec<usize>,
}

impl ChartDataset {
    pub fn new(kind: ChartKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: usize) {
        self.labels.push(label.into());
        self.values.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// 周统计桶
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WeeklyBucket {
    /// 该周的周一
    pub week_start: NaiveDate,
    /// 标签，形如 "W5"
    pub label: String,
    pub count: usize,
}

/// 难度直方图桶，区间为 [low, high)，最高档无上界
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RatingBucket {
    pub label: &'static str,
    pub low: Option<i32>,
    pub high: Option<i32>,
    pub count: usize,
}

/// 频次统计项（语言、标签）
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub label: String,
    pub count: usize,
}
