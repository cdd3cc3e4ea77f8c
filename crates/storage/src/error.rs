//! Typed errors for the object-store layer.
//!
//! Backends report raw failures as [`ObjectStoreError`] with a string code. The session
//! store converts those into the closed [`StorageError`] taxonomy by inspecting the
//! code, so callers can match on a handful of failure modes and know whether a retry
//! makes sense.

use serde::Serialize;
use thiserror::Error;

/// Backend error codes understood by the [`StorageError`] mapping.
pub mod codes {
    pub const OBJECT_NOT_FOUND: &str = "storage/object-not-found";
    pub const UNAUTHENTICATED: &str = "storage/unauthenticated";
    pub const UNAUTHORIZED: &str = "storage/unauthorized";
    pub const QUOTA_EXCEEDED: &str = "storage/quota-exceeded";
    pub const RETRY_LIMIT_EXCEEDED: &str = "storage/retry-limit-exceeded";
    pub const NETWORK_REQUEST_FAILED: &str = "storage/network-request-failed";
    pub const INVALID_ARGUMENT: &str = "storage/invalid-argument";
    pub const UNKNOWN: &str = "storage/unknown";
}

/// Raw failure reported by an [`crate::ObjectStore`] backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ObjectStoreError {
    pub code: String,
    pub message: String,
}

impl ObjectStoreError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }

    #[must_use]
    pub fn not_found(key: &str) -> Self {
        Self::new(codes::OBJECT_NOT_FOUND, format!("object '{key}' does not exist"))
    }

    /// Whether the requested object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code == codes::OBJECT_NOT_FOUND
    }
}

/// Stable, serializable identifier for each [`StorageError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageErrorCode {
    NotAuthenticated,
    SessionNotFound,
    PermissionDenied,
    QuotaExceeded,
    NetworkError,
    Unknown,
}

impl StorageErrorCode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::NetworkError => "NETWORK_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether an operation that failed with this code is worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(*self, Self::NetworkError | Self::Unknown)
    }
}

impl std::fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage failure taxonomy surfaced to callers of the session store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// No signed-in identity.
    #[error("not authenticated")]
    NotAuthenticated,

    /// An explicitly requested session has no blob.
    #[error("session not found: {id}")]
    SessionNotFound { id: String },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Any backend failure without a more specific mapping.
    #[error("storage error: {0}")]
    Unknown(String),
}

impl StorageError {
    #[must_use]
    pub const fn code(&self) -> StorageErrorCode {
        match *self {
            Self::NotAuthenticated => StorageErrorCode::NotAuthenticated,
            Self::SessionNotFound { .. } => StorageErrorCode::SessionNotFound,
            Self::PermissionDenied(_) => StorageErrorCode::PermissionDenied,
            Self::QuotaExceeded(_) => StorageErrorCode::QuotaExceeded,
            Self::Network(_) => StorageErrorCode::NetworkError,
            Self::Unknown(_) => StorageErrorCode::Unknown,
        }
    }

    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

/// Maps by backend code; anything unrecognized (including not-found, which callers
/// handle before converting) becomes [`StorageError::Unknown`].
impl From<ObjectStoreError> for StorageError {
    fn from(err: ObjectStoreError) -> Self {
        match err.code.as_str() {
            codes::UNAUTHENTICATED => Self::NotAuthenticated,
            codes::UNAUTHORIZED => Self::PermissionDenied(err.message),
            codes::QUOTA_EXCEEDED => Self::QuotaExceeded(err.message),
            codes::RETRY_LIMIT_EXCEEDED | codes::NETWORK_REQUEST_FAILED => {
                Self::Network(err.message)
            },
            _ => Self::Unknown(err.to_string()),
        }
    }
}
