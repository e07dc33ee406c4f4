use chrono::Utc;
use serde_json::Value;

pub const UNKNOWN_TIME: &str = "Unknown time";

/// Anything older than ten years is treated as a bogus timestamp.
const MAX_AGE_MILLIS: i64 = 315_360_000_000;

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Relative description of an epoch-millisecond timestamp.
pub fn time_ago(timestamp: i64) -> String {
    time_ago_at(timestamp, now_millis())
}

/// Same as [`time_ago`] against an explicit "now".
pub fn time_ago_at(timestamp: i64, now: i64) -> String {
    if timestamp <= 0 {
        return UNKNOWN_TIME.to_string();
    }
    let diff = now - timestamp;
    if !(0..=MAX_AGE_MILLIS).contains(&diff) {
        return UNKNOWN_TIME.to_string();
    }

    let seconds = diff / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 60 {
        "Just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else {
        plural(days, "day")
    }
}

/// [`time_ago_at`] for an untyped value, e.g. a raw stored field.
pub fn time_ago_value(value: &Value, now: i64) -> String {
    match value.as_i64().or_else(|| value.as_f64().map(|f| f as i64)) {
        Some(timestamp) => time_ago_at(timestamp, now),
        None => UNKNOWN_TIME.to_string(),
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
