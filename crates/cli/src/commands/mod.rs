use std::path::Path;

use anyhow::{Context, Result};
use fieldarea_core::{migration::normalize_points, TrackedPoint};
use serde::Serialize;

pub(crate) mod geometry;
pub(crate) mod sessions;

/// Reads a JSON point array from `path` (`-` for stdin). Both the nested
/// `{point: {lat, lng}, ...}` and the flat `{lat, lng, ...}` shapes are accepted.
pub(crate) fn read_points(path: &Path) -> Result<Vec<TrackedPoint>> {
    let body = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("failed to read points from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read point file {}", path.display()))?
    };
    let raw: serde_json::Value = serde_json::from_str(&body)
        .with_context(|| format!("point file {} is not valid JSON", path.display()))?;
    anyhow::ensure!(raw.is_array(), "point file {} must contain a JSON array", path.display());
    Ok(normalize_points(&raw))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
