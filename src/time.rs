use chrono::{DateTime, Utc};

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn to_date(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or_else(|| DateTime::<Utc>::from_timestamp_millis(0).unwrap())
}

/// Today's date as `YYYY-MM-DD`, the format budget periods are stored in.
pub fn today_str() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
