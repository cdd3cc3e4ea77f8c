//! Lenient field readers for untrusted JSON objects.
//!
//! Every reader returns `None` for a missing or wrongly-typed field instead of failing;
//! callers pick the default.

use chrono::{DateTime, TimeZone as _, Utc};
use serde_json::{Map, Value};

pub(super) type Object = Map<String, Value>;

pub(super) fn string(obj: &Object, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-blank string; whitespace-only counts as missing.
pub(super) fn non_blank_string(obj: &Object, key: &str) -> Option<String> {
    string(obj, key).filter(|s| !s.trim().is_empty())
}

pub(super) fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

pub(super) fn f64_field(obj: &Object, key: &str) -> Option<f64> {
    obj.get(key).and_then(number)
}

#[expect(clippy::cast_possible_truncation, reason = "fractional millis are truncated")]
pub(super) fn i64_field(obj: &Object, key: &str) -> Option<i64> {
    let value = obj.get(key)?;
    value.as_i64().or_else(|| number(value).map(|f| f as i64))
}

pub(super) fn usize_field(obj: &Object, key: &str) -> Option<usize> {
    obj.get(key).and_then(Value::as_u64).and_then(|n| usize::try_from(n).ok())
}

/// Declared document version; anything that is not a non-negative integer is treated
/// as the legacy version.
pub(super) fn version(obj: &Object, key: &str) -> u32 {
    obj.get(key)
        .and_then(Value::as_u64)
        .map_or(crate::schema::LEGACY_VERSION, |v| u32::try_from(v).unwrap_or(u32::MAX))
}

/// ISO-8601 string, or integer epoch milliseconds.
pub(super) fn timestamp(obj: &Object, key: &str) -> Option<DateTime<Utc>> {
    match obj.get(key)? {
        Value::String(s) => {
            DateTime::parse_from_rfc3339(s.trim()).ok().map(|dt| dt.with_timezone(&Utc))
        },
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}
