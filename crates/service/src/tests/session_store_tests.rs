use chrono::Utc;
use fieldarea_core::schema::CURRENT_SCHEMA_VERSION;
use fieldarea_core::{CoreError, CurrentSessionState, TrackedPoint};
use fieldarea_storage::{codes, keys, CallCounts, MemoryObjectStore, StorageErrorCode};

use super::{create_signed_out_store, create_store_with, create_test_store, sample_points, TEST_UID};
use crate::ServiceError;

#[tokio::test]
async fn signed_out_calls_fail_before_touching_storage() {
    let (store, objects) = create_signed_out_store();

    let err = store.save_new_session("  Field A  ", &sample_points(), 123.45).await.unwrap_err();
    assert_eq!(err.code(), Some(StorageErrorCode::NotAuthenticated));
    assert!(!err.is_retryable());

    assert!(store.fetch_index().await.is_err());
    assert!(store.load_session("x").await.is_err());
    assert!(store.update_session("x", &sample_points(), 1.0).await.is_err());
    assert!(store.rename_session("x", "y").await.is_err());
    assert!(store.delete_session("x").await.is_err());
    assert!(store.remove_from_index("x").await.is_err());
    assert!(store.delete_all_sessions().await.is_err());
    assert!(store.rebuild_index().await.is_err());

    assert_eq!(objects.calls(), CallCounts::default());
}

#[tokio::test]
async fn save_new_session_trims_name_and_indexes() {
    let (store, objects) = create_test_store();

    let meta = store.save_new_session("  Field A  ", &sample_points(), 123.45).await.unwrap();
    assert_eq!(meta.name, "Field A");
    assert_eq!(meta.point_count, 3);
    assert_eq!(meta.area, 123.45);
    assert!(uuid::Uuid::parse_str(&meta.id).is_ok());
    assert_eq!(meta.created_at, meta.updated_at);

    let blob = objects.object(&keys::session_key(TEST_UID, &meta.id)).unwrap();
    let blob: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(blob["schemaVersion"], CURRENT_SCHEMA_VERSION);
    assert_eq!(blob["name"], "Field A");
    assert_eq!(blob["points"].as_array().unwrap().len(), 3);

    let index = store.fetch_index().await.unwrap().unwrap();
    assert_eq!(index.sessions, vec![meta]);
}

#[tokio::test]
async fn save_writes_blob_before_index() {
    let (store, objects) = create_test_store();
    // Fail the first put (the blob); the index must stay untouched.
    objects.fail_next(codes::NETWORK_REQUEST_FAILED);

    let err = store.save_new_session("Field", &sample_points(), 1.0).await.unwrap_err();
    assert_eq!(err.code(), Some(StorageErrorCode::NetworkError));
    assert!(err.is_retryable());
    assert!(objects.keys().is_empty());
}

#[tokio::test]
async fn save_rejects_empty_points_and_bad_names() {
    let (store, objects) = create_test_store();

    let err = store.save_new_session("Field", &[], 0.0).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(CoreError::NoPoints)));
    assert_eq!(err.to_string(), "Cannot save session with no points");
    assert_eq!(err.code(), None);

    let err = store.save_new_session("   ", &sample_points(), 0.0).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(CoreError::InvalidName { len: 0 })));

    assert_eq!(objects.calls().puts, 0);
}

#[tokio::test]
async fn saving_twice_appends_to_index() {
    let (store, _objects) = create_test_store();
    let a = store.save_new_session("A", &sample_points(), 1.0).await.unwrap();
    let b = store.save_new_session("B", &sample_points(), 2.0).await.unwrap();
    assert_ne!(a.id, b.id);

    let listed = store.list_sessions().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].updated_at >= listed[1].updated_at);
}

#[tokio::test]
async fn fetch_index_on_first_use_is_none() {
    let (store, _objects) = create_test_store();
    assert!(store.fetch_index().await.unwrap().is_none());
    assert!(store.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_index_degrades_to_empty() {
    let stale = r#"{"version": 1, "sessions": "broken", "lastModified": "2020-01-01T00:00:00Z"}"#;
    for body in ["not json{{", "42", "\"text\"", "null", stale] {
        let (store, _objects) =
            create_store_with(MemoryObjectStore::with_objects([(keys::index_key(TEST_UID), body)]));
        let before = Utc::now();
        let index = store.fetch_index().await.unwrap().unwrap();
        assert_eq!(index.version, 1, "body {body}");
        assert!(index.sessions.is_empty());
        assert!(index.last_modified >= before, "body {body}");
    }
}

#[tokio::test]
async fn corrupt_index_does_not_block_saving() {
    let (store, _objects) =
        create_store_with(MemoryObjectStore::with_objects([(keys::index_key(TEST_UID), "not json{{")]));
    let meta = store.save_new_session("Fresh", &sample_points(), 5.0).await.unwrap();
    assert_eq!(store.list_sessions().await.unwrap(), vec![meta]);
}

#[tokio::test]
async fn legacy_array_index_is_read() {
    let legacy = r#"[{"id": "old", "name": "Old field", "area": 7.5, "pointCount": 4}]"#;
    let (store, _objects) =
        create_store_with(MemoryObjectStore::with_objects([(keys::index_key(TEST_UID), legacy)]));
    let sessions = store.list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].name, "Old field");
    assert_eq!(sessions[0].point_count, 4);
}

#[tokio::test]
async fn index_read_failures_are_mapped() {
    let (store, objects) = create_test_store();
    objects.fail_next(codes::UNAUTHORIZED);
    let err = store.fetch_index().await.unwrap_err();
    assert_eq!(err.code(), Some(StorageErrorCode::PermissionDenied));
    assert!(!err.is_retryable());

    objects.fail_next("storage/brand-new-failure");
    let err = store.fetch_index().await.unwrap_err();
    assert_eq!(err.code(), Some(StorageErrorCode::Unknown));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn load_round_trips_saved_points() {
    let (store, _objects) = create_test_store();
    let meta = store.save_new_session("Field", &sample_points(), 12.0).await.unwrap();

    let data = store.load_session(&meta.id).await.unwrap();
    assert_eq!(data.id, meta.id);
    assert_eq!(data.points, sample_points());
    assert_eq!(data.area, 12.0);
    assert_eq!(data.schema_version, CURRENT_SCHEMA_VERSION);

    let state = CurrentSessionState::from_saved(&meta, &data.points);
    assert!(!state.has_unsaved_changes(&data.points));
}

#[tokio::test]
async fn full_precision_points_survive_save_and_load() {
    let (store, _objects) = create_test_store();
    // Spread over many mantissas; several of these need exact float parsing to round-trip.
    let mut points = vec![TrackedPoint::manual(48.649_787_072_600_716, 2.294_481_307_318_842, 1)];
    let mut lat = 48.649_787_072_600_716_f64;
    let mut lng = 2.294_481_307_318_842_f64;
    for i in 0..200_i64 {
        lat += 0.000_013_717_421_124_829_9 * (1.0 + (i as f64).sin());
        lng -= 0.000_021_938_271_604_938_3 * (1.0 + (i as f64).cos());
        points.push(TrackedPoint::auto(lat, lng, 1_700_000_000_000 + i));
    }
    let area = 123_456.789_012_345_67;

    let meta = store.save_new_session("Precise", &points, area).await.unwrap();
    let state = CurrentSessionState::from_saved(&meta, &points);

    let loaded = store.load_session(&meta.id).await.unwrap();
    assert_eq!(loaded.points, points);
    assert_eq!(loaded.area, area);
    assert!(!state.has_unsaved_changes(&loaded.points));

    let listed = store.list_sessions().await.unwrap();
    assert_eq!(listed[0].area, area);
}

#[tokio::test]
async fn load_missing_session_is_not_found() {
    let (store, _objects) = create_test_store();
    store.save_new_session("Field", &sample_points(), 1.0).await.unwrap();

    let err = store.load_session("missing-id").await.unwrap_err();
    assert_eq!(err.code(), Some(StorageErrorCode::SessionNotFound));
    assert_eq!(err.code().unwrap().as_str(), "SESSION_NOT_FOUND");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn load_migrates_legacy_blob() {
    let legacy = r#"{"name": "", "points": [{"lat": 1.0, "lng": 2.0, "type": "auto", "timestamp": 5}, null]}"#;
    let (store, _objects) = create_store_with(MemoryObjectStore::with_objects([(
        keys::session_key(TEST_UID, "legacy"),
        legacy,
    )]));

    let data = store.load_session("legacy").await.unwrap();
    assert_eq!(data.id, "legacy");
    assert_eq!(data.name, "Unnamed Session");
    assert_eq!(data.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(data.points, vec![TrackedPoint::auto(1.0, 2.0, 5), TrackedPoint::manual(0.0, 0.0, 0)]);
}

#[tokio::test]
async fn load_corrupt_blob_degrades_to_defaults() {
    let (store, _objects) = create_store_with(MemoryObjectStore::with_objects([(
        keys::session_key(TEST_UID, "broken"),
        "{{{",
    )]));
    let data = store.load_session("broken").await.unwrap();
    assert_eq!(data.id, "broken");
    assert!(data.points.is_empty());
}

#[tokio::test]
async fn update_preserves_created_at_and_patches_index() {
    let (store, _objects) = create_test_store();
    let saved = store.save_new_session("Field", &sample_points(), 10.0).await.unwrap();

    let mut points = sample_points();
    points.push(TrackedPoint::manual(0.001, 0.0, 4_000));
    let updated = store.update_session(&saved.id, &points, 12_392.0).await.unwrap();

    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.created_at, saved.created_at);
    assert!(updated.updated_at >= saved.updated_at);
    assert_eq!(updated.point_count, 4);
    assert_eq!(updated.area, 12_392.0);

    let data = store.load_session(&saved.id).await.unwrap();
    assert_eq!(data.created_at, saved.created_at);
    assert_eq!(data.points, points);

    let index = store.fetch_index().await.unwrap().unwrap();
    assert_eq!(index.sessions, vec![updated]);
}

#[tokio::test]
async fn update_validates_and_requires_existing_blob() {
    let (store, _objects) = create_test_store();
    let saved = store.save_new_session("Field", &sample_points(), 10.0).await.unwrap();

    let err = store.update_session(&saved.id, &[], 0.0).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(CoreError::NoPoints)));

    let err = store.update_session("nope", &sample_points(), 0.0).await.unwrap_err();
    assert!(err.is_session_not_found());
}

#[tokio::test]
async fn update_readds_missing_index_entry() {
    let (store, objects) = create_test_store();
    let saved = store.save_new_session("Field", &sample_points(), 10.0).await.unwrap();
    objects.remove(&keys::index_key(TEST_UID));

    let updated = store.update_session(&saved.id, &sample_points(), 11.0).await.unwrap();
    assert_eq!(updated.name, "Field");
    assert_eq!(store.list_sessions().await.unwrap(), vec![updated]);
}

#[tokio::test]
async fn rename_touches_index_only() {
    let (store, objects) = create_test_store();
    let saved = store.save_new_session("Field", &sample_points(), 10.0).await.unwrap();
    let blob_key = keys::session_key(TEST_UID, &saved.id);
    let blob_before = objects.object(&blob_key).unwrap();

    store.rename_session(&saved.id, "  South paddock ").await.unwrap();

    let entry = store.list_sessions().await.unwrap().remove(0);
    assert_eq!(entry.name, "South paddock");
    assert!(entry.updated_at >= saved.updated_at);
    assert_eq!(objects.object(&blob_key).unwrap(), blob_before);

    // The blob picks the index name up on its next update.
    store.update_session(&saved.id, &sample_points(), 10.0).await.unwrap();
    assert_eq!(store.load_session(&saved.id).await.unwrap().name, "South paddock");
}

#[tokio::test]
async fn rename_validates_name_length() {
    let (store, objects) = create_test_store();
    let saved = store.save_new_session("Field", &sample_points(), 10.0).await.unwrap();
    objects.reset_calls();

    let too_long = "x".repeat(101);
    for bad in ["", "   ", too_long.as_str()] {
        let err = store.rename_session(&saved.id, bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(CoreError::InvalidName { .. })));
    }
    store.rename_session(&saved.id, &"x".repeat(100)).await.unwrap();
    assert_eq!(objects.calls().puts, 1);
}

#[tokio::test]
async fn rename_unknown_session_is_not_found() {
    let (store, _objects) = create_test_store();
    let err = store.rename_session("ghost", "Name").await.unwrap_err();
    assert!(err.is_session_not_found());

    store.save_new_session("Field", &sample_points(), 10.0).await.unwrap();
    let err = store.rename_session("ghost", "Name").await.unwrap_err();
    assert!(err.is_session_not_found());
}

#[tokio::test]
async fn delete_removes_blob_and_entry() {
    let (store, objects) = create_test_store();
    let keep = store.save_new_session("Keep", &sample_points(), 1.0).await.unwrap();
    let gone = store.save_new_session("Gone", &sample_points(), 2.0).await.unwrap();

    store.delete_session(&gone.id).await.unwrap();

    assert!(objects.object(&keys::session_key(TEST_UID, &gone.id)).is_none());
    assert_eq!(store.list_sessions().await.unwrap(), vec![keep]);
    assert!(store.load_session(&gone.id).await.unwrap_err().is_session_not_found());
}

#[tokio::test]
async fn delete_without_index_is_consistent() {
    let (store, objects) = create_test_store();
    let saved = store.save_new_session("Field", &sample_points(), 1.0).await.unwrap();
    objects.remove(&keys::index_key(TEST_UID));

    store.delete_session(&saved.id).await.unwrap();
    assert!(objects.keys().is_empty());
}

#[tokio::test]
async fn delete_surfaces_backend_failures() {
    let (store, objects) = create_test_store();
    let saved = store.save_new_session("Field", &sample_points(), 1.0).await.unwrap();
    objects.fail_next(codes::QUOTA_EXCEEDED);

    let err = store.delete_session(&saved.id).await.unwrap_err();
    assert_eq!(err.code(), Some(StorageErrorCode::QuotaExceeded));
    assert_eq!(store.list_sessions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_all_issues_one_delete_per_object() {
    let (store, objects) = create_test_store();
    store.save_new_session("A", &sample_points(), 1.0).await.unwrap();
    store.save_new_session("B", &sample_points(), 2.0).await.unwrap();
    objects.reset_calls();

    store.delete_all_sessions().await.unwrap();

    assert_eq!(objects.calls().deletes, 3);
    assert_eq!(objects.deleted_keys().last().map(String::as_str), Some("users/user-1/index.json"));
    assert!(objects.keys().is_empty());
}

#[tokio::test]
async fn delete_all_without_index_succeeds() {
    let (store, objects) = create_test_store();
    store.save_new_session("A", &sample_points(), 1.0).await.unwrap();
    objects.remove(&keys::index_key(TEST_UID));

    store.delete_all_sessions().await.unwrap();
    assert!(objects.keys().is_empty());
}

#[tokio::test]
async fn delete_all_leaves_other_users_alone() {
    let other_key = keys::session_key("someone-else", "s");
    let (store, objects) =
        create_store_with(MemoryObjectStore::with_objects([(other_key.clone(), "{}")]));
    store.save_new_session("A", &sample_points(), 1.0).await.unwrap();

    store.delete_all_sessions().await.unwrap();
    assert_eq!(objects.keys(), vec![other_key]);
}
