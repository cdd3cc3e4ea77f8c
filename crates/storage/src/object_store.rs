use async_trait::async_trait;

use crate::error::ObjectStoreError;

/// Remote key/value blob store capability.
///
/// Keys are `/`-separated paths (see [`crate::keys`]). Timeouts and retries belong to
/// the implementation; callers issue each call once.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create or overwrite the object at `key`.
    async fn put_object(&self, key: &str, body: &str) -> Result<(), ObjectStoreError>;

    /// Fetch the object body. A missing object fails with
    /// [`crate::codes::OBJECT_NOT_FOUND`].
    async fn get_object(&self, key: &str) -> Result<String, ObjectStoreError>;

    /// Delete the object. A missing object fails with [`crate::codes::OBJECT_NOT_FOUND`].
    async fn delete_object(&self, key: &str) -> Result<(), ObjectStoreError>;

    /// Keys of every object whose key starts with `prefix`, sorted.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, ObjectStoreError>;
}
