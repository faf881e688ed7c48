use chrono::{DateTime, Utc};
use std::fmt::Display;

pub const DASH: &str = "—";

/// `Mon DD, YYYY`, or a dash when the epoch is absent or not positive.
pub fn fmt_date(epoch: Option<i64>) -> String {
    epoch
        .filter(|secs| *secs > 0)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|t| t.format("%b %d, %Y").to_string())
        .unwrap_or_else(|| DASH.to_string())
}

pub fn fmt_datetime(at: DateTime<Utc>) -> String {
    at.format("%b %d, %Y %H:%M UTC").to_string()
}

/// Elapsed wall time as `HH:MM:SS`. Hours are not wrapped; future times clamp to zero.
pub fn format_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total = (now - since).num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Groups digits in threes: `12345` → `12,345`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn or_dash<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| DASH.to_string(), |v| v.to_string())
}
