//! 图表聚合 - 四个互相独立的纯函数，只依赖完整的原始记录集合

use chrono::{Datelike, FixedOffset, NaiveDate};
use cp_common::time::{iso_week_number, local_date, monday_of_week};
use cp_common::SubmissionRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{ChartDataset, ChartKind, FrequencyEntry, RatingBucket, WeeklyBucket};

/// 难度直方图的12个固定分档
const RATING_BUCKETS: [(&str, Option<i32>, Option<i32>); 12] = [
    ("<1000", None, Some(1000)),
    ("1000-1199", Some(1000), Some(1200)),
    ("1200-1399", Some(1200), Some(1400)),
    ("1400-1599", Some(1400), Some(1600)),
    ("1600-1799", Some(1600), Some(1800)),
    ("1800-1999", Some(1800), Some(2000)),
    ("2000-2199", Some(2000), Some(2200)),
    ("2200-2399", Some(2200), Some(2400)),
    ("2400-2599", Some(2400), Some(2600)),
    ("2600-2799", Some(2600), Some(2800)),
    ("2800-2999", Some(2800), Some(3000)),
    (">=3000", Some(3000), None),
];

/// 指定年份的每周提交数，按周一日期升序
pub fn weekly_series(records: &[SubmissionRecord], year: i32, offset: &FixedOffset) -> Vec<WeeklyBucket> {
    let mut weekly: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for record in records {
        let Some(date) = local_date(record.creation_time_seconds, offset) else {
            continue;
        };
        if date.year() == year {
            *weekly.entry(monday_of_week(date)).or_insert(0) += 1;
        }
    }

    weekly
        .into_iter()
        .map(|(monday, count)| WeeklyBucket {
            week_start: monday,
            label: format!("W{}", iso_week_number(monday)),
            count,
        })
        .collect()
}

fn rating_bucket_index(rating: i32) -> usize {
    if rating < 1000 {
        0
    } else if rating >= 3000 {
        RATING_BUCKETS.len() - 1
    } else {
        ((rating - 1000) / 200 + 1) as usize
    }
}

/// 难度直方图，未评级的记录不计入
pub fn rating_histogram(records: &[SubmissionRecord]) -> Vec<RatingBucket> {
    let mut counts = [0usize; 12];

    for rating in records.iter().filter_map(|r| r.problem_rating) {
        counts[rating_bucket_index(rating)] += 1;
    }

    RATING_BUCKETS
        .iter()
        .zip(counts)
        .map(|(&(label, low, high), count)| RatingBucket {
            label,
            low,
            high,
            count,
        })
        .collect()
}

/// 按首次出现顺序计数
fn count_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<FrequencyEntry> {
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut entries: Vec<FrequencyEntry> = Vec::new();

    for value in values {
        match positions.get(value) {
            Some(&pos) => entries[pos].count += 1,
            None => {
                positions.insert(value, entries.len());
                entries.push(FrequencyEntry {
                    label: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    entries
}

/// 语言分布，空字符串同样作为一个类别
pub fn language_distribution(records: &[SubmissionRecord]) -> Vec<FrequencyEntry> {
    count_in_order(records.iter().map(|r| r.language.as_str()))
}

/// 标签频率：按次数降序，次数相同保持首次出现顺序，截取前 limit 个
pub fn tag_frequency(records: &[SubmissionRecord], limit: usize) -> Vec<FrequencyEntry> {
    let mut entries = count_in_order(records.iter().flat_map(|r| r.tags()));
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(limit);
    entries
}

/// 与选中年份无关的三项聚合结果
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    pub rating_histogram: Vec<RatingBucket>,
    pub languages: Vec<FrequencyEntry>,
    pub tags: Vec<FrequencyEntry>,
}

impl Aggregates {
    pub fn compute(records: &[SubmissionRecord], top_tags: usize) -> Self {
        Self {
            rating_histogram: rating_histogram(records),
            languages: language_distribution(records),
            tags: tag_frequency(records, top_tags),
        }
    }

    pub fn rating_dataset(&self) -> ChartDataset {
        let mut dataset = ChartDataset::new(ChartKind::Bar, "Problems by Rating");
        for bucket in &self.rating_histogram {
            dataset.push(bucket.label, bucket.count);
        }
        dataset
    }

    pub fn language_dataset(&self) -> ChartDataset {
        frequency_dataset(ChartKind::Pie, "Language Usage", &self.languages)
    }

    pub fn tag_dataset(&self) -> ChartDataset {
        frequency_dataset(ChartKind::HorizontalBar, "Tag Frequency", &self.tags)
    }
}

fn frequency_dataset(kind: ChartKind, title: &str, entries: &[FrequencyEntry]) -> ChartDataset {
    let mut dataset = ChartDataset::new(kind, title);
    for entry in entries {
        dataset.push(entry.label.clone(), entry.count);
    }
    dataset
}

/// 周统计折线图数据
pub fn weekly_dataset(year: Option<i32>, buckets: &[WeeklyBucket]) -> ChartDataset {
    let title = match year {
        Some(year) => format!("Solved Problems per Week ({})", year),
        None => "Solved Problems per Week".to_string(),
    };
    let mut dataset = ChartDataset::new(ChartKind::Line, title);
    for bucket in buckets {
        dataset.push(bucket.label.clone(), bucket.count);
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    fn record(rating: Option<i32>, tags: &str, language: &str, time: i64) -> SubmissionRecord {
        SubmissionRecord {
            problem_id: "1A".to_string(),
            problem_name: None,
            contest_id: None,
            problem_index: None,
            problem_rating: rating,
            problem_tags: tags.to_string(),
            language: language.to_string(),
            creation_time_seconds: time,
        }
    }

    #[test]
    fn test_weekly_series_groups_by_iso_week() {
        let records = vec![
            record(None, "", "C", at(2024, 1, 2)),
            record(None, "", "C", at(2024, 1, 7)),
            record(None, "", "C", at(2024, 2, 1)),
            record(None, "", "C", at(2023, 12, 31)),
        ];
        let series = weekly_series(&records, 2024, &utc());

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "W1");
        assert_eq!(series[0].count, 2);
        assert_eq!(series[0].week_start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(series[1].label, "W5");
        assert_eq!(series[1].count, 1);
    }

    #[test]
    fn test_weekly_series_empty_year() {
        let records = vec![record(None, "", "C", at(2024, 3, 3))];
        assert!(weekly_series(&records, 2022, &utc()).is_empty());
    }

    #[test]
    fn test_weekly_series_year_boundary_week() {
        // 2025-01-01 是周三，所在周的周一属于上一年，但仍计入2025年
        let records = vec![record(None, "", "C", at(2025, 1, 1))];
        let series = weekly_series(&records, 2025, &utc());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].week_start, NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
        assert_eq!(series[0].label, "W1");
    }

    #[test]
    fn test_rating_histogram_scenario() {
        let records: Vec<_> = [Some(900), Some(1150), None, Some(2450)]
            .into_iter()
            .map(|r| record(r, "", "C", 0))
            .collect();
        let histogram = rating_histogram(&records);

        assert_eq!(histogram.len(), 12);
        let counts: Vec<usize> = histogram.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(counts.iter().sum::<usize>(), 3);
        assert_eq!(histogram[8].label, "2400-2599");
    }

    #[test]
    fn test_rating_histogram_boundaries() {
        assert_eq!(rating_bucket_index(999), 0);
        assert_eq!(rating_bucket_index(1000), 1);
        assert_eq!(rating_bucket_index(1199), 1);
        assert_eq!(rating_bucket_index(1200), 2);
        assert_eq!(rating_bucket_index(2999), 10);
        assert_eq!(rating_bucket_index(3000), 11);
        assert_eq!(rating_bucket_index(3500), 11);
        assert_eq!(rating_bucket_index(-5), 0);
    }

    #[test]
    fn test_language_distribution_keeps_first_seen_order_and_empty_key() {
        let records = vec![
            record(None, "", "Rust", 0),
            record(None, "", "", 0),
            record(None, "", "GNU C++17", 0),
            record(None, "", "Rust", 0),
        ];
        let languages = language_distribution(&records);
        let pairs: Vec<(&str, usize)> = languages.iter().map(|e| (e.label.as_str(), e.count)).collect();
        assert_eq!(pairs, vec![("Rust", 2), ("", 1), ("GNU C++17", 1)]);
    }

    #[test]
    fn test_tag_frequency_sorted_stable_and_truncated() {
        let records = vec![
            record(None, "b, a", "C", 0),
            record(None, "a,c", "C", 0),
            record(None, "c, d", "C", 0),
        ];
        let tags = tag_frequency(&records, 15);
        let labels: Vec<&str> = tags.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "c", "b", "d"]);

        let many: Vec<_> = (0..20).map(|i| record(None, &format!("t{}", i), "C", 0)).collect();
        let top = tag_frequency(&many, 15);
        assert_eq!(top.len(), 15);
        assert_eq!(top[0].label, "t0");
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_datasets_are_shaped_for_charts() {
        let records = vec![record(Some(1300), "math", "Rust", at(2024, 1, 2))];
        let aggregates = Aggregates::compute(&records, 15);

        let ratings = aggregates.rating_dataset();
        assert_eq!(ratings.kind, ChartKind::Bar);
        assert_eq!(ratings.labels.len(), 12);
        assert_eq!(ratings.labels[11], ">=3000");
        assert_eq!(ratings.values[2], 1);

        assert_eq!(aggregates.language_dataset().kind, ChartKind::Pie);
        assert_eq!(aggregates.tag_dataset().labels, vec!["math"]);

        let weekly = weekly_dataset(Some(2024), &weekly_series(&records, 2024, &utc()));
        assert_eq!(weekly.title, "Solved Problems per Week (2024)");
        assert_eq!(weekly.labels, vec!["W1"]);
        assert_eq!(weekly.values, vec![1]);
    }
}
