//! Tolerant date parsing for upstream date fields.
//!
//! Upstreams send ISO-8601 with or without offsets, bare dates, dates with
//! trailing noise, and words such as "ASAP". Everything is resolved to a
//! UTC instant; values that no strategy understands are reported as
//! [`MapError::UnresolvableDate`] so the caller can substitute its default.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

use crate::error::{MapError, MapResult};

/// Words meaning "as soon as possible", resolved to the processing time.
const NOW_WORDS: &[&str] = &["immediate", "immediat", "immediately", "asap", "null", "now"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a date-valued field.
///
/// Strategies, in order: "now" words and empty values, RFC 3339 (a `Z`
/// suffix is UTC), ISO-8601 with a `+HHMM` offset, naive date-times taken
/// as UTC, a `YYYY-MM-DD` prefix, and integer Unix timestamps.
pub fn parse_date(value: &Value, now: DateTime<Utc>) -> MapResult<DateTime<Utc>> {
    match value {
        Value::Null => Ok(now),
        Value::String(raw) => parse_date_str(raw, now),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(|| unresolvable(&n.to_string())),
        other => Err(unresolvable(&other.to_string())),
    }
}

fn parse_date_str(raw: &str, now: DateTime<Utc>) -> MapResult<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() || NOW_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w)) {
        return Ok(now);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc());
        }
    }

    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| unresolvable(raw))
}

fn unresolvable(value: &str) -> MapError {
    MapError::UnresolvableDate {
        value: value.to_string(),
    }
}

/// Canonical text form: RFC 3339, UTC, second precision.
///
/// Instants past [`far_future`] are clamped to it, since RFC 3339 has no
/// five-digit years.
pub fn format_date(dt: DateTime<Utc>) -> String {
    dt.min(far_future()).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse `value`, falling back to `default` when it cannot be resolved.
pub fn normalize_date(value: &Value, default: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match parse_date(value, now) {
        Ok(dt) => format_date(dt),
        Err(err) => {
            tracing::debug!("{}; using {}", err, format_date(default));
            format_date(default)
        }
    }
}

/// The "no deadline" sentinel, `9999-12-31T23:59:59Z`.
pub fn far_future() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
