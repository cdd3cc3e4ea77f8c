//! Local filesystem object store.
//!
//! Each key maps to a file under a root directory, with `/` separators becoming path
//! components. Writes go to a temp file in the same directory and are renamed into
//! place, so readers never observe a half-written object.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt as _;

use crate::error::{codes, ObjectStoreError};
use crate::object_store::ObjectStore;

const TEMP_MARKER: &str = ".tmp-";
/// Length of the simple-format uuid appended after [`TEMP_MARKER`].
const TEMP_SUFFIX_LEN: usize = 32;

/// Whether the last segment of `key` is an in-flight temp file written by `put_object`.
fn is_temp_key(key: &str) -> bool {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    file_name.rsplit_once(TEMP_MARKER).is_some_and(|(stem, suffix)| {
        !stem.is_empty()
            && suffix.len() == TEMP_SUFFIX_LEN
            && suffix.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

fn map_io(err: &io::Error, key: &str) -> ObjectStoreError {
    let code = match err.kind() {
        io::ErrorKind::NotFound => codes::OBJECT_NOT_FOUND,
        io::ErrorKind::PermissionDenied => codes::UNAUTHORIZED,
        io::ErrorKind::StorageFull => codes::QUOTA_EXCEEDED,
        io::ErrorKind::TimedOut
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected => codes::NETWORK_REQUEST_FAILED,
        _ => codes::UNKNOWN,
    };
    ObjectStoreError::new(code, format!("'{key}': {err}"))
}

fn invalid_key(key: &str) -> ObjectStoreError {
    ObjectStoreError::new(codes::INVALID_ARGUMENT, format!("invalid object key '{key}'"))
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `key` under the root. Rejects empty, `.`/`..` and rooted components so
    /// no key can escape the root directory.
    fn resolve(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        let trimmed = key.strip_suffix('/').unwrap_or(key);
        if trimmed.is_empty() {
            return Err(invalid_key(key));
        }
        let mut path = self.root.clone();
        for part in trimmed.split('/') {
            let mut components = Path::new(part).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(name)), None) if !part.contains('\\') => path.push(name),
                _ => return Err(invalid_key(key)),
            }
        }
        Ok(path)
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Option<Vec<&str>> = relative
            .components()
            .map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();
        parts.map(|p| p.join("/"))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put_object(&self, key: &str, body: &str) -> Result<(), ObjectStoreError> {
        let path = self.resolve(key)?;
        let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
            return Err(invalid_key(key));
        };
        fs::create_dir_all(parent).await.map_err(|e| map_io(&e, key))?;

        let mut temp_name = file_name.to_os_string();
        temp_name.push(format!("{TEMP_MARKER}{}", uuid::Uuid::new_v4().simple()));
        let temp_path = parent.join(temp_name);

        let write = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(body.as_bytes()).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &path).await
        };
        if let Err(e) = write.await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(map_io(&e, key));
        }
        tracing::trace!(key, bytes = body.len(), "object written");
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<String, ObjectStoreError> {
        let path = self.resolve(key)?;
        fs::read_to_string(&path).await.map_err(|e| map_io(&e, key))
    }

    async fn delete_object(&self, key: &str) -> Result<(), ObjectStoreError> {
        let path = self.resolve(key)?;
        fs::remove_file(&path).await.map_err(|e| map_io(&e, key))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, ObjectStoreError> {
        // A prefix ending in '/' names a directory; otherwise scan its parent and filter.
        let start = if prefix.ends_with('/') {
            self.resolve(prefix)?
        } else {
            match prefix.rsplit_once('/') {
                Some((dir, _)) => self.resolve(dir)?,
                None => self.root.clone(),
            }
        };

        let mut keys = Vec::new();
        let mut pending = vec![start];
        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(map_io(&e, prefix)),
            };
            while let Some(entry) = entries.next_entry().await.map_err(|e| map_io(&e, prefix))? {
                let file_type = entry.file_type().await.map_err(|e| map_io(&e, prefix))?;
                let path = entry.path();
                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Some(key) = self.key_for(&path) else {
                    tracing::warn!(path = %path.display(), "skipping non-UTF-8 object path");
                    continue;
                };
                if key.starts_with(prefix) && !is_temp_key(&key) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
