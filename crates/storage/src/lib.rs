//! Object-store layer for fieldarea.
//!
//! The [`ObjectStore`] capability (put/get/delete/list by key), the per-user key
//! layout, backend error codes with their mapping onto the [`StorageError`] taxonomy,
//! and two backends: in-memory and local filesystem.

mod error;
mod fs;
pub mod keys;
mod memory;
mod object_store;
#[cfg(test)]
mod tests;

pub use error::{codes, ObjectStoreError, StorageError, StorageErrorCode};
pub use fs::FsObjectStore;
pub use memory::{CallCounts, MemoryObjectStore};
pub use object_store::ObjectStore;
