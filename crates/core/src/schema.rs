//! Persisted schema definitions.
//!
//! Single source of truth for the "current version" of every stored document,
//! consumed by both the migration module and the session store.

/// Schema version stamped on every session blob written or migrated.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Envelope version of the per-user index document.
pub const CURRENT_INDEX_VERSION: u32 = 1;

/// Version assumed for documents that carry no version field.
pub const LEGACY_VERSION: u32 = 0;

/// Display name given to sessions stored without one.
pub const DEFAULT_SESSION_NAME: &str = "Unnamed Session";

/// Inclusive bounds on a session name's length, in characters, after trimming.
pub const MIN_NAME_LEN: usize = 1;
pub const MAX_NAME_LEN: usize = 100;

/// Validates and trims a user-supplied session name.
///
/// # Errors
/// Returns [`crate::CoreError::InvalidName`] if the trimmed name is empty or longer
/// than [`MAX_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> crate::Result<String> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(crate::CoreError::InvalidName { len });
    }
    Ok(trimmed.to_owned())
}
