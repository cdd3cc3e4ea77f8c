use std::path::Path;

use anyhow::Result;
use fieldarea_core::{coordinates, compute_polygon_area};
use fieldarea_service::SessionStore;
use serde_json::json;

use super::{print_json, read_points};

pub(crate) async fn run_list(store: &SessionStore) -> Result<()> {
    print_json(&store.list_sessions().await?)
}

pub(crate) async fn run_save(store: &SessionStore, file: &Path, name: &str) -> Result<()> {
    let points = read_points(file)?;
    let area = compute_polygon_area(&coordinates(&points));
    print_json(&store.save_new_session(name, &points, area).await?)
}

pub(crate) async fn run_update(store: &SessionStore, id: &str, file: &Path) -> Result<()> {
    let points = read_points(file)?;
    let area = compute_polygon_area(&coordinates(&points));
    print_json(&store.update_session(id, &points, area).await?)
}

pub(crate) async fn run_load(store: &SessionStore, id: &str) -> Result<()> {
    print_json(&store.load_session(id).await?)
}

pub(crate) async fn run_rename(store: &SessionStore, id: &str, name: &str) -> Result<()> {
    store.rename_session(id, name).await?;
    print_json(&json!({ "renamed": id }))
}

pub(crate) async fn run_delete(store: &SessionStore, id: &str) -> Result<()> {
    store.delete_session(id).await?;
    print_json(&json!({ "deleted": id }))
}

pub(crate) async fn run_repair(store: &SessionStore, id: &str) -> Result<()> {
    store.remove_from_index(id).await?;
    print_json(&json!({ "removedFromIndex": id }))
}

pub(crate) async fn run_rebuild_index(store: &SessionStore) -> Result<()> {
    print_json(&store.rebuild_index().await?)
}

pub(crate) async fn run_purge(store: &SessionStore) -> Result<()> {
    store.delete_all_sessions().await?;
    print_json(&json!({ "purged": true }))
}
