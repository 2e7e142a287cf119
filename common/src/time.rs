//! 时间派生工具 - 所有日期均按配置的固定时区偏移计算

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate};

/// 将Unix秒转换为本地日历日期，超出可表示范围时返回None
pub fn local_date(timestamp: i64, offset: &FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.with_timezone(offset).date_naive())
}

/// 提交所在年份
pub fn year_of(timestamp: i64, offset: &FixedOffset) -> Option<i32> {
    local_date(timestamp, offset).map(|date| date.year())
}

/// 日期所在周的周一
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// ISO 8601 周序号（第1周包含当年第一个周四）
pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// 格式化为 YYYY-MM-DD
pub fn format_date(timestamp: i64, offset: &FixedOffset) -> Option<String> {
    local_date(timestamp, offset).map(|date| date.format("%Y-%m-%d").to_string())
}
