use std::result::Result as StdResult;

use thiserror::Error;

/// Validation failures raised before any storage is touched.
///
/// These are distinct from storage errors and never worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Cannot save session with no points")]
    NoPoints,

    #[error("Session name must be 1..=100 characters after trimming, got {len}")]
    InvalidName { len: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, CoreError>;
