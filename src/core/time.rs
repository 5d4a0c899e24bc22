//! Shared timestamp helpers: audit envelopes and flight datetime parsing.

use crate::core::error::RosterError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value as JsonValue;
use ulid::Ulid;

/// Canonical storage/display format for flight timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Returns unix-epoch seconds with `Z` suffix (e.g. `1771220592Z`).
pub fn now_epoch_z() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{}Z", secs)
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}

/// Standard command response envelope shape used for JSON output.
pub fn command_envelope(cmd: &str, status: &str, extra: JsonValue) -> JsonValue {
    let mut base = serde_json::json!({
        "envelope_version": "1.0.0",
        "ts": now_epoch_z(),
        "event_id": new_event_id(),
        "cmd": cmd,
        "status": status
    });
    if let (Some(base_obj), Some(extra_obj)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra_obj {
            base_obj.insert(k.clone(), v.clone());
        }
    }
    base
}

pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, RosterError> {
    let trimmed = input.trim();
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| {
            RosterError::InvalidInput(format!(
                "'{}' is not a datetime (expected YYYY-MM-DD HH:MM[:SS])",
                input
            ))
        })
}

pub fn parse_date(input: &str) -> Result<NaiveDate, RosterError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        RosterError::InvalidInput(format!("'{}' is not a date (expected YYYY-MM-DD)", input))
    })
}

/// Lower bound of an inclusive range. A bare date means midnight.
pub fn parse_range_start(input: &str) -> Result<NaiveDateTime, RosterError> {
    match parse_date(input) {
        Ok(date) => Ok(date.and_time(NaiveTime::MIN)),
        Err(_) => parse_datetime(input),
    }
}

/// Upper bound of an inclusive range. A bare date covers the whole day.
pub fn parse_range_end(input: &str) -> Result<NaiveDateTime, RosterError> {
    match parse_date(input) {
        Ok(date) => Ok(date.and_hms_opt(23, 59, 59).unwrap_or(date.and_time(NaiveTime::MIN))),
        Err(_) => parse_datetime(input),
    }
}

pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub fn format_optional(dt: &Option<NaiveDateTime>) -> String {
    dt.as_ref().map(format_datetime).unwrap_or_default()
}

/// `YYYY-MM` bucket used by the monthly workload report.
pub fn year_month(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m").to_string()
}
