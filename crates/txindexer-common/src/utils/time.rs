use chrono::{DateTime, SecondsFormat, Utc};

/// Wall clock in milliseconds; the retention window orders records by it.
pub fn current_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// RFC 3339 rendering of a millisecond timestamp.
pub fn format_timestamp_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
