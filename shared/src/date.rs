//! 时间处理模块
//!
//! 表单中的日期/时间输入均为字符串（`<input type="date">` 与 `<input type="time">`），
//! 此模块负责解析与格式化：
//! - `parse_schedule`: 表单输入 -> `NaiveDateTime`
//! - `schedule_value`: 本地 `NaiveDateTime` -> 带时区偏移的 `scheduledDate`
//! - `display_timestamp`: 后端的 RFC 3339 时间 -> 本地时间的显示文本

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];
const SCHEDULE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DISPLAY_FORMAT: &str = "%b %-d, %Y %H:%M";

/// 解析表单中的日期与时间
///
/// 返回 None 如果任一部分无法解析
pub fn parse_schedule(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()?;
    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time.trim(), fmt).ok())?;
    Some(date.and_time(time))
}

/// 订单中的排期字段：表单时间按 `tz` 解释，输出 RFC 3339（含偏移）
///
/// 夏令时切换导致的重复时刻取较早者；跳过的时刻按 UTC 处理。
pub fn schedule_value<Tz: TimeZone>(at: NaiveDateTime, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    tz.from_local_datetime(&at)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&at))
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// 将后端返回的时间格式化为浏览器本地时间
///
/// 无法解析时原样返回
pub fn display_timestamp(raw: &str) -> String {
    display_timestamp_in(raw, &Local)
}

/// 同 `display_timestamp`，但转换到指定时区；不带偏移的时间原样按墙上时间显示
pub fn display_timestamp_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(tz).format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, SCHEDULE_FORMAT) {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    raw.to_string()
}
