//! Migration v1: legacy (unversioned) documents to the versioned shapes.
//!
//! Session blobs: default identity fields and rewrite every point into the nested
//! `{point: {lat, lng}, type, timestamp}` shape. Indexes: the bare-array format gets
//! an envelope, and entries learn `pointCount` from an embedded `points` array.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::fields::{self, Object};
use super::normalize_point;
use crate::schema::{DEFAULT_SESSION_NAME, LEGACY_VERSION};
use crate::TrackedPoint;

fn point_value(p: &TrackedPoint) -> Value {
    json!({
        "point": {"lat": p.point.lat, "lng": p.point.lng},
        "type": p.kind.as_str(),
        "timestamp": p.captured_at_millis,
    })
}

fn default_timestamps(doc: &mut Object, keys: &[&str], now: DateTime<Utc>) {
    for key in keys {
        if fields::timestamp(doc, key).is_none() {
            doc.insert((*key).to_owned(), Value::String(now.to_rfc3339()));
        }
    }
}

pub(super) fn upgrade_session(mut doc: Object, now: DateTime<Utc>) -> Object {
    if fields::string(&doc, "id").is_none() {
        doc.insert("id".to_owned(), Value::String(String::new()));
    }
    if fields::non_blank_string(&doc, "name").is_none() {
        doc.insert("name".to_owned(), Value::String(DEFAULT_SESSION_NAME.to_owned()));
    }
    default_timestamps(&mut doc, &["createdAt", "updatedAt"], now);

    // Positions are preserved: malformed entries become placeholders, never gaps.
    let points = match doc.get("points") {
        Some(Value::Array(items)) => {
            items.iter().map(|item| point_value(&normalize_point(item))).collect()
        },
        _ => Vec::new(),
    };
    doc.insert("points".to_owned(), Value::Array(points));
    doc
}

/// Envelope for the bare-array index format, which predates versioning.
pub(super) fn wrap_legacy_index(entries: &[Value]) -> Object {
    let mut doc = Object::new();
    doc.insert("version".to_owned(), Value::from(LEGACY_VERSION));
    doc.insert("sessions".to_owned(), Value::Array(entries.to_vec()));
    doc
}

pub(super) fn upgrade_index(mut doc: Object, now: DateTime<Utc>) -> Object {
    if !matches!(doc.get("sessions"), Some(Value::Array(_))) {
        doc.insert("sessions".to_owned(), Value::Array(Vec::new()));
        doc.insert("lastModified".to_owned(), Value::String(now.to_rfc3339()));
    }
    default_timestamps(&mut doc, &["lastModified"], now);

    if let Some(Value::Array(entries)) = doc.get_mut("sessions") {
        for entry in entries.iter_mut() {
            let Value::Object(meta) = entry else { continue };
            if fields::usize_field(meta, "pointCount").is_some() {
                continue;
            }
            let embedded = match meta.get("points") {
                Some(Value::Array(points)) => Some(points.len()),
                _ => None,
            };
            if let Some(count) = embedded {
                meta.insert("pointCount".to_owned(), Value::from(count));
            }
        }
    }
    doc
}
