//! Timestamp parsing shared by the parser (temporal bounds) and the
//! validators (timestamp values and freshness checks).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive date-time layouts accepted in addition to RFC 3339.
const NAIVE_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO 8601 timestamp into a UTC instant.
///
/// Supports:
/// - RFC 3339 with offset or `Z` (e.g., "2024-01-15T10:30:00Z")
/// - Naive date-times, interpreted as UTC (e.g., "2024-01-15T10:30:00",
///   "2024-01-15 10:30:00")
/// - Date only, interpreted as midnight UTC (e.g., "2024-01-15")
///
/// Returns `None` when the text matches none of these forms.
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Converts a Unix epoch expressed in (possibly fractional) seconds.
///
/// Returns `None` for non-finite values or instants chrono cannot represent.
pub fn instant_from_epoch(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = ((seconds - whole) * 1_000_000_000.0).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}
