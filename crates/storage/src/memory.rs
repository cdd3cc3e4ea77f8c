//! In-process object store.
//!
//! Backs tests and offline use. Counts every call and can be told to fail the next
//! one with a chosen backend code, which makes call sequences and error mapping
//! observable.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::ObjectStoreError;
use crate::object_store::ObjectStore;

/// Number of calls of each kind seen by a [`MemoryObjectStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub puts: usize,
    pub gets: usize,
    pub deletes: usize,
    pub lists: usize,
}

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<String, String>,
    calls: CallCounts,
    fail_next: Option<String>,
    deleted_keys: Vec<String>,
}

impl Inner {
    fn take_failure(&mut self, key: &str) -> Result<(), ObjectStoreError> {
        match self.fail_next.take() {
            Some(code) => Err(ObjectStoreError::new(code, format!("injected failure at '{key}'"))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    inner: Mutex<Inner>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `objects`. Seeding is not counted as calls.
    pub fn with_objects<K, V>(objects: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut inner = store.lock();
            for (key, body) in objects {
                inner.objects.insert(key.into(), body.into());
            }
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes `body` at `key` without counting a call.
    pub fn insert(&self, key: impl Into<String>, body: impl Into<String>) {
        self.lock().objects.insert(key.into(), body.into());
    }

    /// Removes `key` without counting a call, simulating an out-of-band deletion.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.lock().objects.remove(key)
    }

    #[must_use]
    pub fn object(&self, key: &str) -> Option<String> {
        self.lock().objects.get(key).cloned()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.lock().objects.keys().cloned().collect()
    }

    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// Keys passed to successful deletes, in call order.
    #[must_use]
    pub fn deleted_keys(&self) -> Vec<String> {
        self.lock().deleted_keys.clone()
    }

    pub fn reset_calls(&self) {
        let mut inner = self.lock();
        inner.calls = CallCounts::default();
        inner.deleted_keys.clear();
    }

    /// Makes the next call of any kind fail with backend `code`.
    pub fn fail_next(&self, code: &str) {
        self.lock().fail_next = Some(code.to_owned());
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, key: &str, body: &str) -> Result<(), ObjectStoreError> {
        let mut inner = self.lock();
        inner.calls.puts += 1;
        inner.take_failure(key)?;
        inner.objects.insert(key.to_owned(), body.to_owned());
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<String, ObjectStoreError> {
        let mut inner = self.lock();
        inner.calls.gets += 1;
        inner.take_failure(key)?;
        inner.objects.get(key).cloned().ok_or_else(|| ObjectStoreError::not_found(key))
    }

    async fn delete_object(&self, key: &str) -> Result<(), ObjectStoreError> {
        let mut inner = self.lock();
        inner.calls.deletes += 1;
        inner.take_failure(key)?;
        if inner.objects.remove(key).is_none() {
            return Err(ObjectStoreError::not_found(key));
        }
        inner.deleted_keys.push(key.to_owned());
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, ObjectStoreError> {
        let mut inner = self.lock();
        inner.calls.lists += 1;
        inner.take_failure(prefix)?;
        Ok(inner.objects.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
    }
}
