use std::path::Path;

use anyhow::Result;
use fieldarea_core::constants::DEFAULT_BOUNDS_PADDING;
use fieldarea_core::env_config::env_parse_with_default;
use fieldarea_core::{
    coordinates, compute_bounds_meters, compute_polygon_area, expand_bounds, format_area,
    hash_points,
};
use serde_json::json;

use super::{print_json, read_points};

pub(crate) fn run_area(file: &Path) -> Result<()> {
    let points = read_points(file)?;
    let area = compute_polygon_area(&coordinates(&points));
    print_json(&json!({
        "pointCount": points.len(),
        "area": area,
        "formatted": format_area(area),
    }))
}

pub(crate) fn run_bounds(file: &Path, padding: Option<f64>) -> Result<()> {
    let points = read_points(file)?;
    let padding = padding
        .unwrap_or_else(|| env_parse_with_default("FIELDAREA_BOUNDS_PADDING", DEFAULT_BOUNDS_PADDING));
    let Some(metrics) = compute_bounds_meters(&coordinates(&points)) else {
        tracing::debug!(points = points.len(), "too few points for bounds");
        return print_json(&json!({ "bounds": null, "padded": null }));
    };
    print_json(&json!({
        "bounds": metrics,
        "padding": padding,
        "padded": expand_bounds(&metrics, padding),
    }))
}

pub(crate) fn run_hash(file: &Path) -> Result<()> {
    let points = read_points(file)?;
    print_json(&json!({ "pointCount": points.len(), "hash": hash_points(&points) }))
}
