use cp_common::SubmissionRecord;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::models::FilterOptions;

/// 筛选索引 - 标签到记录下标的映射，以及筛选控件的可选值
#[derive(Debug, Clone, Default)]
pub struct FilterIndex {
    /// 标签 -> 记录下标列表（升序）
    pub tag_index: HashMap<String, Vec<usize>>,
    /// 全部语言（去除空白、非空）
    pub languages: BTreeSet<String>,
}

impl FilterIndex {
    pub fn from_records(records: &[SubmissionRecord]) -> Self {
        let mut builder = FilterIndexBuilder::new();
        for record in records {
            builder.add_record(record);
        }
        builder.build()
    }

    /// 命中任意选中标签的记录下标，按原始顺序排列
    pub fn candidates_for_tags(&self, tags: &BTreeSet<String>) -> BTreeSet<usize> {
        let mut result = BTreeSet::new();

        for tag in tags {
            if let Some(ids) = self.tag_index.get(tag) {
                result.extend(ids.iter().copied());
            }
        }

        result
    }

    /// 排序后的标签和语言列表
    pub fn options(&self) -> FilterOptions {
        let mut tags: Vec<String> = self.tag_index.keys().cloned().collect();
        tags.sort();

        FilterOptions {
            tags,
            languages: self.languages.iter().cloned().collect(),
        }
    }
}

/// 筛选索引构建器
pub struct FilterIndexBuilder {
    next_id: usize,
    tag_index: HashMap<String, Vec<usize>>,
    languages: BTreeSet<String>,
}

impl FilterIndexBuilder {
    /// 创建新的筛选索引构建器
    pub fn new() -> Self {
        Self {
            next_id: 0,
            tag_index: HashMap::new(),
            languages: BTreeSet::new(),
        }
    }

    /// 添加记录，下标按添加顺序递增
    pub fn add_record(&mut self, record: &SubmissionRecord) {
        let id = self.next_id;

        for tag in record.tags() {
            self.tag_index.entry(tag.to_string()).or_default().push(id);
        }

        let language = record.language.trim();
        if !language.is_empty() {
            self.languages.insert(language.to_string());
        }

        self.next_id += 1;
    }

    /// 构建筛选索引
    pub fn build(self) -> FilterIndex {
        debug!(
            records = self.next_id,
            tags = self.tag_index.len(),
            languages = self.languages.len(),
            "筛选索引构建完成"
        );

        FilterIndex {
            tag_index: self.tag_index,
            languages: self.languages,
        }
    }
}

impl Default for FilterIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}
