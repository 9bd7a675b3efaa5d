//! Display formatting for amounts and timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::sanitize::PLACEHOLDER;

/// Format an amount with two decimals, grouped thousands and a currency suffix.
///
/// Non-finite and negative values are shown as zero.
pub fn format_amount(value: f64, currency_suffix: &str) -> String {
    let value = if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    };

    let fixed = format!("{:.2}", value);
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if currency_suffix.is_empty() {
        format!("{}.{}", grouped, cents)
    } else {
        format!("{}.{} {}", grouped, cents, currency_suffix)
    }
}

/// Parse the timestamp formats the dashboard is known to store
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a timestamp for display, in UTC
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Render an optional raw timestamp, or the placeholder if absent or unreadable
pub fn format_timestamp(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|dt| format_datetime(&dt))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
