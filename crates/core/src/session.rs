use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::change_hash::hash_points;
use crate::schema::{CURRENT_INDEX_VERSION, CURRENT_SCHEMA_VERSION};
use crate::TrackedPoint;

/// Summary of a saved session, as kept in the per-user index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Enclosed area in square meters.
    pub area: f64,
    pub point_count: usize,
}

/// Full persisted session blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub schema_version: u32,
    pub area: f64,
    pub points: Vec<TrackedPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SessionData {
    /// Builds a fresh blob at the current schema version, created and updated at `now`.
    #[must_use]
    pub fn new(
        id: String,
        name: String,
        points: Vec<TrackedPoint>,
        area: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
            area,
            points,
            notes: None,
        }
    }

    /// Index entry describing this blob.
    #[must_use]
    pub fn meta(&self) -> SessionMeta {
        SessionMeta {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            area: self.area,
            point_count: self.points.len(),
        }
    }
}

/// Per-user directory of session summaries.
///
/// Entry order carries no meaning; use [`UserSessionIndex::sorted_by_recent`] for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSessionIndex {
    pub version: u32,
    pub sessions: Vec<SessionMeta>,
    pub last_modified: DateTime<Utc>,
}

impl UserSessionIndex {
    #[must_use]
    pub const fn empty(now: DateTime<Utc>) -> Self {
        Self { version: CURRENT_INDEX_VERSION, sessions: Vec::new(), last_modified: now }
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&SessionMeta> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut SessionMeta> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Replaces the entry with the same id, or appends it.
    pub fn upsert(&mut self, meta: SessionMeta) {
        match self.find_mut(&meta.id) {
            Some(existing) => *existing = meta,
            None => self.sessions.push(meta),
        }
    }

    /// Removes every entry with `id`. Returns `true` if anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        self.sessions.len() != before
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified = now;
    }

    /// Entries ordered by `updated_at`, most recent first.
    #[must_use]
    pub fn sorted_by_recent(&self) -> Vec<SessionMeta> {
        let mut sessions = self.sessions.clone();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions
    }
}

/// Caller-held record of the session currently open for editing.
///
/// Never persisted by the store; thread it through the caller's own state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSessionState {
    pub id: String,
    pub name: String,
    pub last_saved_at: DateTime<Utc>,
    pub points_hash_at_save: String,
}

impl CurrentSessionState {
    /// Baseline taken right after `meta` was saved (or loaded) with `points`.
    #[must_use]
    pub fn from_saved(meta: &SessionMeta, points: &[TrackedPoint]) -> Self {
        Self {
            id: meta.id.clone(),
            name: meta.name.clone(),
            last_saved_at: meta.updated_at,
            points_hash_at_save: hash_points(points),
        }
    }

    #[must_use]
    pub fn has_unsaved_changes(&self, points: &[TrackedPoint]) -> bool {
        hash_points(points) != self.points_hash_at_save
    }
}

/// Whether `points` differ from what was last saved.
///
/// With no current session, anything recorded counts as unsaved.
#[must_use]
pub fn has_unsaved_changes(current: Option<&CurrentSessionState>, points: &[TrackedPoint]) -> bool {
    current.map_or(!points.is_empty(), |state| state.has_unsaved_changes(points))
}
