//! Timestamp and unit conversions for flight records.
//!
//! The store keeps epoch seconds (REAL affinity, so `f64` in and out) and
//! every column is nullable; all helpers here are `None`-in/`None`-out. All
//! conversions use the local clock and local calendar days, matching the
//! owning application's display conventions.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

const SECONDS_PER_DAY: i64 = 86_400;
const MILES_PER_KM: f64 = 0.621371;

fn local_datetime(ts: f64) -> Option<DateTime<Local>> {
    Local.timestamp_opt(ts as i64, 0).single()
}

/// Epoch seconds for a naive local datetime.
///
/// A datetime inside a skipped DST hour has no local representation; fall
/// back to reading it as UTC rather than failing the whole query.
pub fn local_epoch(naive: NaiveDateTime) -> f64 {
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.timestamp() as f64,
        None => naive.and_utc().timestamp() as f64,
    }
}

/// ISO-8601 local-time string, e.g. `2026-03-14T09:30:00`.
pub fn to_iso(ts: Option<f64>) -> Option<String> {
    local_datetime(ts?).map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// Local calendar day, `YYYY-MM-DD`.
pub fn to_date(ts: Option<f64>) -> Option<String> {
    local_datetime(ts?).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Human-readable display string, e.g. `Mar 14, 2026 09:30 AM`.
pub fn to_display(ts: Option<f64>) -> Option<String> {
    local_datetime(ts?).map(|dt| dt.format("%b %d, %Y %I:%M %p").to_string())
}

/// Flight duration as `"<H>h <M>m"`.
///
/// Floor-division semantics: a reversed pair (arrival before departure) is
/// not clamped and yields a negative hour count with minutes still in 0..60.
pub fn duration(dep: Option<f64>, arr: Option<f64>) -> Option<String> {
    let secs = (arr? - dep?) as i64;
    let hours = secs.div_euclid(3600);
    let minutes = secs.rem_euclid(3600) / 60;
    Some(format!("{hours}h {minutes}m"))
}

/// Whole days between now and `ts`, floored. Negative for past timestamps.
pub fn days_until(ts: Option<f64>) -> Option<i64> {
    let delta = ts? as i64 - Local::now().timestamp();
    Some(delta.div_euclid(SECONDS_PER_DAY))
}

/// Kilometers to whole miles, floored.
///
/// A zero distance maps to `None` (the store uses 0 for "unknown" on some
/// imported rows), matching the per-flight display contract.
pub fn km_to_miles(km: Option<f64>) -> Option<i64> {
    match km {
        Some(km) if km != 0.0 => Some((km * MILES_PER_KM) as i64),
        _ => None,
    }
}
