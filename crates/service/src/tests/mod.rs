//! Test utilities and module declarations for session store tests.

use std::sync::Arc;

use fieldarea_core::TrackedPoint;
use fieldarea_storage::MemoryObjectStore;

use crate::{SessionStore, StaticIdentity};

mod session_store_tests;

pub const TEST_UID: &str = "user-1";

pub fn create_test_store() -> (SessionStore, Arc<MemoryObjectStore>) {
    create_store_with(MemoryObjectStore::new())
}

pub fn create_store_with(objects: MemoryObjectStore) -> (SessionStore, Arc<MemoryObjectStore>) {
    let objects = Arc::new(objects);
    let store = SessionStore::new(objects.clone(), Arc::new(StaticIdentity::signed_in(TEST_UID)));
    (store, objects)
}

pub fn create_signed_out_store() -> (SessionStore, Arc<MemoryObjectStore>) {
    let objects = Arc::new(MemoryObjectStore::new());
    let store = SessionStore::new(objects.clone(), Arc::new(StaticIdentity::signed_out()));
    (store, objects)
}

pub fn sample_points() -> Vec<TrackedPoint> {
    vec![
        TrackedPoint::manual(0.0, 0.0, 1_000),
        TrackedPoint::auto(0.0, 0.001, 2_000),
        TrackedPoint::manual(0.001, 0.001, 3_000),
    ]
}
