//! Object key layout.
//!
//! ```text
//! users/{uid}/index.json
//! users/{uid}/sessions/{sessionId}.json
//! ```

const USERS_ROOT: &str = "users";
const SESSIONS_DIR: &str = "sessions";
const JSON_EXT: &str = ".json";

#[must_use]
pub fn index_key(uid: &str) -> String {
    format!("{USERS_ROOT}/{uid}/index.json")
}

#[must_use]
pub fn sessions_prefix(uid: &str) -> String {
    format!("{USERS_ROOT}/{uid}/{SESSIONS_DIR}/")
}

#[must_use]
pub fn session_key(uid: &str, session_id: &str) -> String {
    format!("{}{session_id}{JSON_EXT}", sessions_prefix(uid))
}

/// Inverse of [`session_key`]: the session id encoded in `key`, if it is a session blob
/// key for `uid`.
#[must_use]
pub fn session_id_from_key<'a>(uid: &str, key: &'a str) -> Option<&'a str> {
    let prefix = sessions_prefix(uid);
    key.strip_prefix(prefix.as_str())?
        .strip_suffix(JSON_EXT)
        .filter(|id| !id.is_empty() && !id.contains('/'))
}
