//! Typed error enum for the service layer.
//!
//! Keeps validation failures apart from the storage taxonomy: only storage errors carry
//! a [`StorageErrorCode`], and only some of those are retryable.

use fieldarea_core::CoreError;
use fieldarea_storage::{StorageError, StorageErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Object store or identity failure, classified per [`StorageErrorCode`].
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Caller input rejected before touching storage (no points, bad name).
    #[error(transparent)]
    InvalidInput(#[from] CoreError),

    /// A document could not be encoded for upload.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    /// Storage classification, if this is a storage failure.
    #[must_use]
    pub const fn code(&self) -> Option<StorageErrorCode> {
        match *self {
            Self::Storage(ref e) => Some(e.code()),
            _ => None,
        }
    }

    /// Whether retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match *self {
            Self::Storage(ref e) => e.is_retryable(),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_session_not_found(&self) -> bool {
        self.code() == Some(StorageErrorCode::SessionNotFound)
    }
}
