//! Parsing helpers for the timestamp and time-of-day formats found in the
//! source tables.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};

/// Naive formats accepted for `timestamp_utc` after an optional ` UTC` suffix is stripped.
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse an observation instant.
///
/// Accepts RFC 3339 (`2023-01-22T12:09:39Z`) as well as the database dump
/// format `2023-01-22 12:09:39.388884 UTC`. Naive timestamps are taken as UTC.
pub fn parse_timestamp_utc(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = trimmed.strip_suffix("UTC").unwrap_or(trimmed).trim_end();
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("Invalid timestamp '{}'", raw))
}

/// Parse a local time-of-day in `HH:MM:SS` form (fractional seconds allowed).
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, String> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .map_err(|e| format!("Invalid time of day '{}': {}", raw, e))
}

/// Round to two decimal places, the precision used by every report value.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
