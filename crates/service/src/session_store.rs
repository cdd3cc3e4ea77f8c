//! Session persistence over an object store.
//!
//! Each user has one index document (summaries for listing) and one blob per session.
//! Every mutating operation performs its writes strictly in sequence, blob first and
//! index second, with no transaction spanning them. The index is therefore only
//! eventually consistent with the blobs:
//!
//! - an index entry whose blob is gone surfaces as `SESSION_NOT_FOUND` when loaded;
//!   callers repair it with [`SessionStore::remove_from_index`];
//! - a blob with no index entry is invisible to listing until
//!   [`SessionStore::rebuild_index`] runs.
//!
//! The store keeps no state between calls. Callers serialize operations on the same
//! session themselves.

use std::sync::Arc;

use chrono::Utc;
use fieldarea_core::schema::{validate_name, CURRENT_SCHEMA_VERSION};
use fieldarea_core::{
    migrate_index, migrate_session_data, CoreError, SessionData, SessionMeta, TrackedPoint,
    UserSessionIndex,
};
use fieldarea_storage::{keys, ObjectStore, StorageError};
use serde_json::Value;

use crate::error::ServiceError;
use crate::identity::IdentityProvider;

type Result<T> = std::result::Result<T, ServiceError>;

pub struct SessionStore {
    store: Arc<dyn ObjectStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("store", &"<dyn ObjectStore>")
            .field("uid", &self.identity.current_uid())
            .finish()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    /// Single authentication guard every operation passes before any storage call.
    fn require_uid(&self) -> std::result::Result<String, StorageError> {
        self.identity.current_uid().ok_or(StorageError::NotAuthenticated)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Raw document I/O
    // ─────────────────────────────────────────────────────────────────────────────

    /// Index document, or `None` if it was never written.
    ///
    /// A body that is not JSON, or is JSON of the wrong kind, yields a fresh empty
    /// index instead of an error: a corrupt index must never block sign-in or saving.
    async fn read_index(&self, uid: &str) -> Result<Option<UserSessionIndex>> {
        let key = keys::index_key(uid);
        let body = match self.store.get_object(&key).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                tracing::debug!(uid = %uid, "no session index yet");
                return Ok(None);
            },
            Err(e) => return Err(StorageError::from(e).into()),
        };

        let index = match serde_json::from_str::<Value>(&body) {
            Ok(raw @ (Value::Object(_) | Value::Array(_))) => migrate_index(&raw),
            Ok(_) => {
                tracing::warn!(uid = %uid, "session index is not a JSON object, starting fresh");
                UserSessionIndex::empty(Utc::now())
            },
            Err(e) => {
                tracing::warn!(uid = %uid, error = %e, "session index is not valid JSON, starting fresh");
                UserSessionIndex::empty(Utc::now())
            },
        };
        Ok(Some(index))
    }

    async fn write_index(&self, uid: &str, index: &mut UserSessionIndex) -> Result<()> {
        index.touch(Utc::now());
        let body = serde_json::to_string(index)?;
        self.store.put_object(&keys::index_key(uid), &body).await.map_err(StorageError::from)?;
        Ok(())
    }

    /// Raw session blob body, or `None` if absent.
    async fn read_blob(&self, uid: &str, session_id: &str) -> Result<Option<String>> {
        match self.store.get_object(&keys::session_key(uid, session_id)).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(StorageError::from(e).into()),
        }
    }

    async fn write_blob(&self, uid: &str, data: &SessionData) -> Result<()> {
        let body = serde_json::to_string(data)?;
        self.store
            .put_object(&keys::session_key(uid, &data.id), &body)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    /// Parses and migrates a blob stored under `session_id`. The key is authoritative
    /// for the id.
    fn decode_blob(session_id: &str, raw: &Value) -> SessionData {
        let mut data = migrate_session_data(raw);
        if data.id != session_id {
            if !data.id.is_empty() {
                tracing::warn!(session_id, stored_id = %data.id, "session blob id disagrees with its key");
            }
            session_id.clone_into(&mut data.id);
        }
        data
    }

    async fn remove_entry(&self, uid: &str, session_id: &str) -> Result<()> {
        let Some(mut index) = self.read_index(uid).await? else {
            return Ok(());
        };
        if !index.remove(session_id) {
            tracing::debug!(uid = %uid, session_id, "no index entry to remove");
            return Ok(());
        }
        self.write_index(uid, &mut index).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// The signed-in user's index, or `None` on first use.
    pub async fn fetch_index(&self) -> Result<Option<UserSessionIndex>> {
        let uid = self.require_uid()?;
        self.read_index(&uid).await
    }

    /// Index entries, most recently updated first. Empty on first use.
    pub async fn list_sessions(&self) -> Result<Vec<SessionMeta>> {
        Ok(self.fetch_index().await?.map(|index| index.sorted_by_recent()).unwrap_or_default())
    }

    /// Persists a new session under a fresh id and adds it to the index.
    pub async fn save_new_session(
        &self,
        name: &str,
        points: &[TrackedPoint],
        area: f64,
    ) -> Result<SessionMeta> {
        let uid = self.require_uid()?;
        if points.is_empty() {
            return Err(CoreError::NoPoints.into());
        }
        let name = validate_name(name)?;

        let data = SessionData::new(
            uuid::Uuid::new_v4().to_string(),
            name,
            points.to_vec(),
            area,
            Utc::now(),
        );
        self.write_blob(&uid, &data).await?;

        let meta = data.meta();
        let mut index =
            self.read_index(&uid).await?.unwrap_or_else(|| UserSessionIndex::empty(Utc::now()));
        index.upsert(meta.clone());
        self.write_index(&uid, &mut index).await?;

        tracing::info!(uid = %uid, session_id = %meta.id, points = meta.point_count, "saved new session");
        Ok(meta)
    }

    /// Replaces the points and area of an existing session.
    ///
    /// `created_at` and notes are preserved; the blob's name is refreshed from the index.
    pub async fn update_session(
        &self,
        session_id: &str,
        points: &[TrackedPoint],
        area: f64,
    ) -> Result<SessionMeta> {
        let uid = self.require_uid()?;
        if points.is_empty() {
            return Err(CoreError::NoPoints.into());
        }

        let Some(body) = self.read_blob(&uid, session_id).await? else {
            return Err(StorageError::SessionNotFound { id: session_id.to_owned() }.into());
        };
        let raw = serde_json::from_str::<Value>(&body).unwrap_or(Value::Null);
        let existing = Self::decode_blob(session_id, &raw);
        let mut index =
            self.read_index(&uid).await?.unwrap_or_else(|| UserSessionIndex::empty(Utc::now()));

        let now = Utc::now().max(existing.created_at);
        let data = SessionData {
            id: existing.id,
            name: index.find(session_id).map_or(existing.name, |entry| entry.name.clone()),
            created_at: existing.created_at,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
            area,
            points: points.to_vec(),
            notes: existing.notes,
        };
        self.write_blob(&uid, &data).await?;

        let meta = match index.find_mut(session_id) {
            Some(entry) => {
                entry.area = area;
                entry.point_count = points.len();
                entry.updated_at = now.max(entry.created_at);
                entry.clone()
            },
            None => {
                tracing::warn!(uid = %uid, session_id, "updated session was missing from index, re-adding");
                let meta = data.meta();
                index.upsert(meta.clone());
                meta
            },
        };
        self.write_index(&uid, &mut index).await?;

        tracing::info!(uid = %uid, session_id, points = meta.point_count, "updated session");
        Ok(meta)
    }

    /// Full session blob, migrated to the current schema.
    ///
    /// Fails with `SESSION_NOT_FOUND` if the blob is missing, including when the index
    /// still lists it.
    pub async fn load_session(&self, session_id: &str) -> Result<SessionData> {
        let uid = self.require_uid()?;
        let Some(body) = self.read_blob(&uid, session_id).await? else {
            tracing::debug!(uid = %uid, session_id, "session blob not found");
            return Err(StorageError::SessionNotFound { id: session_id.to_owned() }.into());
        };
        let raw = serde_json::from_str::<Value>(&body).unwrap_or_else(|e| {
            tracing::warn!(uid = %uid, session_id, error = %e, "session blob is not valid JSON, using defaults");
            Value::Null
        });
        Ok(Self::decode_blob(session_id, &raw))
    }

    /// Renames a session in the index only. The blob's copy of the name is refreshed on
    /// its next update.
    pub async fn rename_session(&self, session_id: &str, new_name: &str) -> Result<()> {
        let uid = self.require_uid()?;
        let name = validate_name(new_name)?;

        let not_found = || StorageError::SessionNotFound { id: session_id.to_owned() };
        let mut index = self.read_index(&uid).await?.ok_or_else(not_found)?;
        let entry = index.find_mut(session_id).ok_or_else(not_found)?;
        entry.name = name;
        entry.updated_at = Utc::now().max(entry.created_at);
        self.write_index(&uid, &mut index).await?;

        tracing::info!(uid = %uid, session_id, "renamed session");
        Ok(())
    }

    /// Deletes the blob, then its index entry. A blob that is already gone is tolerated
    /// so dangling entries can be deleted too.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let uid = self.require_uid()?;
        match self.store.delete_object(&keys::session_key(&uid, session_id)).await {
            Ok(()) => {},
            Err(e) if e.is_not_found() => {
                tracing::warn!(uid = %uid, session_id, "session blob already missing, removing index entry");
            },
            Err(e) => return Err(StorageError::from(e).into()),
        }
        self.remove_entry(&uid, session_id).await?;

        tracing::info!(uid = %uid, session_id, "deleted session");
        Ok(())
    }

    /// Drops an index entry without touching any blob. Writes nothing if the entry (or
    /// the whole index) is absent.
    pub async fn remove_from_index(&self, session_id: &str) -> Result<()> {
        let uid = self.require_uid()?;
        self.remove_entry(&uid, session_id).await
    }

    /// Deletes every session blob for the user, then the index.
    pub async fn delete_all_sessions(&self) -> Result<()> {
        let uid = self.require_uid()?;
        let blob_keys = self
            .store
            .list_objects(&keys::sessions_prefix(&uid))
            .await
            .map_err(StorageError::from)?;

        for key in &blob_keys {
            match self.store.delete_object(key).await {
                Ok(()) => {},
                Err(e) if e.is_not_found() => tracing::debug!(key = %key, "blob vanished before delete"),
                Err(e) => return Err(StorageError::from(e).into()),
            }
        }
        match self.store.delete_object(&keys::index_key(&uid)).await {
            Ok(()) => {},
            Err(e) if e.is_not_found() => tracing::debug!(uid = %uid, "no index to delete"),
            Err(e) => return Err(StorageError::from(e).into()),
        }

        tracing::info!(uid = %uid, count = blob_keys.len(), "deleted all sessions");
        Ok(())
    }

    /// Regenerates the index from the blobs actually present.
    ///
    /// Names and later update times from the previous index win over the blobs' copies,
    /// since renames only touch the index. Blobs that are not valid JSON are skipped.
    pub async fn rebuild_index(&self) -> Result<UserSessionIndex> {
        let uid = self.require_uid()?;
        let blob_keys = self
            .store
            .list_objects(&keys::sessions_prefix(&uid))
            .await
            .map_err(StorageError::from)?;

        let mut rebuilt = UserSessionIndex::empty(Utc::now());
        for key in &blob_keys {
            let Some(session_id) = keys::session_id_from_key(&uid, key) else {
                tracing::debug!(key = %key, "ignoring non-session object");
                continue;
            };
            let Some(body) = self.read_blob(&uid, session_id).await? else {
                continue;
            };
            match serde_json::from_str::<Value>(&body) {
                Ok(raw) => rebuilt.upsert(Self::decode_blob(session_id, &raw).meta()),
                Err(e) => tracing::warn!(key = %key, error = %e, "skipping unreadable session blob"),
            }
        }

        if let Some(previous) = self.read_index(&uid).await? {
            for entry in &mut rebuilt.sessions {
                if let Some(old) = previous.find(&entry.id) {
                    entry.name.clone_from(&old.name);
                    entry.updated_at = entry.updated_at.max(old.updated_at);
                }
            }
        }
        self.write_index(&uid, &mut rebuilt).await?;

        tracing::info!(uid = %uid, count = rebuilt.sessions.len(), "rebuilt session index");
        Ok(rebuilt)
    }
}
