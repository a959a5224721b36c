//! Timestamp and age formatting helpers.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};

/// Local wall-clock time of a data timestamp, e.g. "14:05". Missing → "─".
pub fn fmt_clock(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "─".into(),
        |t| t.with_timezone(&Local).format("%H:%M").to_string(),
    )
}

/// Local date + time, e.g. "Jan 03 14:05".
pub fn fmt_stamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || "─".into(),
        |t| t.with_timezone(&Local).format("%b %d %H:%M").to_string(),
    )
}

/// Compact age since the last local refresh: "just now", "42s ago", "3m ago".
pub fn fmt_age(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 5 {
        "just now".into()
    } else if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}
