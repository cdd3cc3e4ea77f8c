//! Forward migration of persisted JSON to the current schema.
//!
//! Input is untrusted: any JSON value is accepted and nothing here fails. Missing or
//! wrongly-typed fields degrade to defaults, because a stored session is unrecoverable
//! once rejected and partial data beats none. Transforms run as a sequential chain keyed
//! on the declared version; afterwards every field is still read defensively and the
//! result is stamped with the current version. Inputs are never mutated.

mod fields;
mod v1;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::schema::{CURRENT_INDEX_VERSION, CURRENT_SCHEMA_VERSION, DEFAULT_SESSION_NAME};
use crate::{Point, PointKind, SessionData, SessionMeta, TrackedPoint, UserSessionIndex};
use fields::Object;

/// Decodes one stored point.
///
/// Accepts the nested `{point: {lat, lng}, type, timestamp}` shape and the legacy flat
/// `{lat, lng, type, timestamp}` shape. Anything without numeric coordinates becomes a
/// manual point at `(0, 0)`.
#[must_use]
pub fn normalize_point(value: &Value) -> TrackedPoint {
    let Value::Object(obj) = value else {
        return TrackedPoint::new(Point::zero(), PointKind::Manual, 0);
    };
    let coords = match obj.get("point") {
        Some(Value::Object(nested)) => nested,
        _ => obj,
    };
    let captured_at_millis = fields::i64_field(obj, "timestamp").unwrap_or(0);
    match (fields::f64_field(coords, "lat"), fields::f64_field(coords, "lng")) {
        (Some(lat), Some(lng)) => {
            let kind = obj
                .get("type")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<PointKind>().ok())
                .unwrap_or_default();
            TrackedPoint::new(Point::new(lat, lng), kind, captured_at_millis)
        },
        _ => TrackedPoint::new(Point::zero(), PointKind::Manual, captured_at_millis),
    }
}

/// Decodes a stored point array, one output per input element. Non-arrays yield nothing.
#[must_use]
pub fn normalize_points(value: &Value) -> Vec<TrackedPoint> {
    match value {
        Value::Array(items) => items.iter().map(normalize_point).collect(),
        _ => Vec::new(),
    }
}

/// `(created, updated)` with defaults, keeping `updated >= created`.
fn timestamps(obj: &Object, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let created_at = fields::timestamp(obj, "createdAt").unwrap_or(now);
    let updated_at = fields::timestamp(obj, "updatedAt").unwrap_or(now).max(created_at);
    (created_at, updated_at)
}

fn name(obj: &Object) -> String {
    fields::non_blank_string(obj, "name").unwrap_or_else(|| DEFAULT_SESSION_NAME.to_owned())
}

fn decode_session(doc: &Object, now: DateTime<Utc>) -> SessionData {
    let (created_at, updated_at) = timestamps(doc, now);
    SessionData {
        id: fields::string(doc, "id").unwrap_or_default(),
        name: name(doc),
        created_at,
        updated_at,
        schema_version: CURRENT_SCHEMA_VERSION,
        area: fields::f64_field(doc, "area").unwrap_or(0.0),
        points: doc.get("points").map(normalize_points).unwrap_or_default(),
        notes: fields::string(doc, "notes"),
    }
}

fn decode_meta(entry: &Object, now: DateTime<Utc>) -> SessionMeta {
    let (created_at, updated_at) = timestamps(entry, now);
    SessionMeta {
        id: fields::string(entry, "id").unwrap_or_default(),
        name: name(entry),
        created_at,
        updated_at,
        area: fields::f64_field(entry, "area").unwrap_or(0.0),
        point_count: fields::usize_field(entry, "pointCount").unwrap_or(0),
    }
}

fn decode_index(doc: &Object, now: DateTime<Utc>) -> UserSessionIndex {
    let (sessions, last_modified) = match doc.get("sessions") {
        Some(Value::Array(entries)) => (
            entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Object(meta) => Some(decode_meta(meta, now)),
                other => {
                    tracing::warn!(entry = %other, "dropping non-object session index entry");
                    None
                },
            })
            .collect(),
            fields::timestamp(doc, "lastModified").unwrap_or(now),
        ),
        // No usable session list: the document is reinitialized, timestamp included.
        _ => {
            tracing::warn!("session index has no sessions array, reinitializing");
            (Vec::new(), now)
        },
    };
    UserSessionIndex { version: CURRENT_INDEX_VERSION, sessions, last_modified }
}

/// Upgrades any decoded JSON to a current-version [`SessionData`].
#[must_use]
pub fn migrate_session_data(raw: &Value) -> SessionData {
    migrate_session_data_at(raw, Utc::now())
}

/// [`migrate_session_data`] with an explicit "now" for defaulted timestamps.
#[must_use]
pub fn migrate_session_data_at(raw: &Value, now: DateTime<Utc>) -> SessionData {
    let mut doc = match raw {
        Value::Object(obj) => obj.clone(),
        other => {
            tracing::warn!(kind = json_kind(other), "session blob is not an object, using defaults");
            Object::new()
        },
    };
    let version = fields::version(&doc, "schemaVersion");
    if version > CURRENT_SCHEMA_VERSION {
        tracing::warn!(version, current = CURRENT_SCHEMA_VERSION, "session blob is newer than this build");
    }

    if version < 1 {
        tracing::debug!(from = version, "migrating session blob to v1");
        doc = v1::upgrade_session(doc, now);
    }

    decode_session(&doc, now)
}

/// Upgrades any decoded JSON (or `null` for "absent") to a current-version index.
#[must_use]
pub fn migrate_index(raw: &Value) -> UserSessionIndex {
    migrate_index_at(raw, Utc::now())
}

/// [`migrate_index`] with an explicit "now" for defaulted timestamps.
#[must_use]
pub fn migrate_index_at(raw: &Value, now: DateTime<Utc>) -> UserSessionIndex {
    // The unversioned format is recognized by shape: a bare array with no envelope.
    let mut doc = match raw {
        Value::Object(obj) => obj.clone(),
        Value::Array(entries) => v1::wrap_legacy_index(entries),
        Value::Null => return UserSessionIndex::empty(now),
        other => {
            tracing::warn!(kind = json_kind(other), "session index is not an object, using empty index");
            return UserSessionIndex::empty(now);
        },
    };
    let version = fields::version(&doc, "version");

    if version < 1 {
        tracing::debug!(from = version, "migrating session index to v1");
        doc = v1::upgrade_index(doc, now);
    }

    decode_index(&doc, now)
}

const fn json_kind(value: &Value) -> &'static str {
    match *value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
