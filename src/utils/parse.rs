// src/utils/parse.rs

//! Tolerant parsing of provider-supplied strings.
//!
//! The registry emits dates and numbers as loosely formatted strings;
//! anything unparseable maps to `None` rather than an error so a single
//! bad field never poisons a record.

use chrono::NaiveDate;

/// Parse an ISO-style provider date. Absent, empty or malformed -> `None`.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    // Some endpoints return full timestamps for date fields.
    chrono::DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .ok()
}

/// Parse a listing-page date caption.
///
/// Tries the direct ISO form first; on failure reinterprets a
/// `-`-delimited value as day-month-year. Both failing -> `None`.
pub fn parse_listing_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(date) = parse_date(Some(trimmed)) {
        return Some(date);
    }
    if trimmed.split('-').count() == 3 {
        return NaiveDate::parse_from_str(trimmed, "%d-%m-%Y").ok();
    }
    None
}

/// Parse a provider decimal string. Absent/empty/malformed -> `None`.
pub fn parse_decimal(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Parse a provider integer string. Absent/empty/malformed -> `None`.
pub fn parse_integer(raw: Option<&str>) -> Option<i64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}
