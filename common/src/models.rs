use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::error::{CommonError, Result};

/// 数据源未提供错误消息时的默认提示
pub const DEFAULT_FETCH_ERROR: &str = "Failed to fetch data. Please try again.";

/// 提交记录 - 单次通过的题目及其元数据，接收后不可变
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SubmissionRecord {
    /// 题目ID，例如 "1850A"
    pub problem_id: String,
    /// 题目名称
    #[serde(default)]
    pub problem_name: Option<String>,
    /// 比赛ID，仅用于生成题目链接
    #[serde(default)]
    pub contest_id: Option<i64>,
    /// 题目序号，仅用于生成题目链接
    #[serde(default)]
    pub problem_index: Option<String>,
    /// 题目难度，缺失表示未评级（不同于0）
    #[serde(default)]
    pub problem_rating: Option<i32>,
    /// 逗号连接的标签字符串
    #[serde(default, deserialize_with = "null_as_default")]
    pub problem_tags: String,
    /// 提交语言
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    /// 提交时间（Unix秒）
    pub creation_time_seconds: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SubmissionRecord {
    /// 派生的标签集合：去除首尾空白、丢弃空标签、按首次出现顺序去重
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for tag in self.problem_tags.split(',').map(str::trim) {
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// 展示用名称
    pub fn display_name(&self) -> &str {
        match self.problem_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "N/A",
        }
    }

    /// 题目外部链接，比赛ID为6位及以上时视为Gym题目
    pub fn problem_url(&self) -> Option<String> {
        let contest_id = self.contest_id.filter(|id| *id != 0)?;
        let index = self.problem_index.as_deref().filter(|i| !i.is_empty())?;

        if contest_id.to_string().len() >= 6 {
            Some(format!("https://codeforces.com/gym/{}/problem/{}", contest_id, index))
        } else {
            Some(format!(
                "https://codeforces.com/problemset/problem/{}/{}",
                contest_id, index
            ))
        }
    }

    pub fn rating_tier(&self) -> RatingTier {
        RatingTier::from_rating(self.problem_rating)
    }
}

/// 难度分档，与 Codeforces 段位对应
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RatingTier {
    Unrated,
    Newbie,
    Pupil,
    Specialist,
    Expert,
    CandidateMaster,
    Master,
    InternationalMaster,
    Grandmaster,
    InternationalGrandmaster,
    LegendaryGrandmaster,
}

impl RatingTier {
    pub fn from_rating(rating: Option<i32>) -> Self {
        match rating {
            None | Some(0) => RatingTier::Unrated,
            Some(r) if r < 1200 => RatingTier::Newbie,
            Some(r) if r < 1400 => RatingTier::Pupil,
            Some(r) if r < 1600 => RatingTier::Specialist,
            Some(r) if r < 1900 => RatingTier::Expert,
            Some(r) if r < 2100 => RatingTier::CandidateMaster,
            Some(r) if r < 2300 => RatingTier::Master,
            Some(r) if r < 2400 => RatingTier::InternationalMaster,
            Some(r) if r < 2600 => RatingTier::Grandmaster,
            Some(r) if r < 3000 => RatingTier::InternationalGrandmaster,
            Some(_) => RatingTier::LegendaryGrandmaster,
        }
    }
}

/// 数据源响应 - 成功时携带提交列表，失败时携带错误消息
#[derive(Deserialize, Debug)]
#[serde(tag = "status")]
pub enum FetchResponse {
    #[serde(rename = "OK")]
    Ok {
        #[serde(default)]
        submissions: Vec<SubmissionRecord>,
    },
    #[serde(rename = "Error")]
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

impl FetchResponse {
    /// 从JSON文本解析响应
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 转换为记录列表或数据源错误
    pub fn into_result(self) -> Result<Vec<SubmissionRecord>> {
        match self {
            FetchResponse::Ok { submissions } => Ok(submissions),
            FetchResponse::Error { message } => {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FETCH_ERROR.to_string());
                warn!("数据源返回错误: {}", message);
                Err(CommonError::DataSource(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tags: &str) -> SubmissionRecord {
        SubmissionRecord {
            problem_id: "1A".to_string(),
            problem_name: Some("Theatre Square".to_string()),
            contest_id: Some(1),
            problem_index: Some("A".to_string()),
            problem_rating: Some(1000),
            problem_tags: tags.to_string(),
            language: "GNU C++17".to_string(),
            creation_time_seconds: 1_700_000_000,
        }
    }

    #[test]
    fn test_tags_are_trimmed_deduplicated_and_ordered() {
        let r = record(" math, greedy ,, math,implementation ");
        assert_eq!(r.tags(), vec!["math", "greedy", "implementation"]);
        assert!(record("").tags().is_empty());
        assert!(record(" , ,").tags().is_empty());
    }

    #[test]
    fn test_problem_url_problemset_and_gym() {
        let mut r = record("");
        assert_eq!(
            r.problem_url().as_deref(),
            Some("https://codeforces.com/problemset/problem/1/A")
        );

        r.contest_id = Some(104_501);
        assert_eq!(
            r.problem_url().as_deref(),
            Some("https://codeforces.com/gym/104501/problem/A")
        );

        r.problem_index = None;
        assert_eq!(r.problem_url(), None);
    }

    #[test]
    fn test_rating_tier_boundaries() {
        assert_eq!(RatingTier::from_rating(None), RatingTier::Unrated);
        assert_eq!(RatingTier::from_rating(Some(0)), RatingTier::Unrated);
        assert_eq!(RatingTier::from_rating(Some(1199)), RatingTier::Newbie);
        assert_eq!(RatingTier::from_rating(Some(1200)), RatingTier::Pupil);
        assert_eq!(RatingTier::from_rating(Some(1900)), RatingTier::CandidateMaster);
        assert_eq!(RatingTier::from_rating(Some(2399)), RatingTier::InternationalMaster);
        assert_eq!(RatingTier::from_rating(Some(3500)), RatingTier::LegendaryGrandmaster);
    }

    #[test]
    fn test_record_defaults_for_missing_and_null_fields() {
        let json = r#"{"problem_id": "2B", "language": null, "creation_time_seconds": 10}"#;
        let r: SubmissionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.problem_rating, None);
        assert_eq!(r.language, "");
        assert_eq!(r.problem_tags, "");
        assert_eq!(r.display_name(), "N/A");
    }

    #[test]
    fn test_fetch_response_ok_and_error() {
        let ok = FetchResponse::from_json(
            r#"{"status": "OK", "submissions": [{"problem_id": "1A", "creation_time_seconds": 1}]}"#,
        )
        .unwrap();
        assert_eq!(ok.into_result().unwrap().len(), 1);

        let err = FetchResponse::from_json(r#"{"status": "Error", "message": "handle not found"}"#)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(err.to_string(), "handle not found");

        let bare = FetchResponse::from_json(r#"{"status": "Error"}"#)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(bare.to_string(), DEFAULT_FETCH_ERROR);
    }
}
