//! Planar geometry over lat/lng sequences.
//!
//! Uses an equirectangular projection around a local reference, which is accurate
//! for field-sized polygons (up to tens of kilometers across). Results are
//! approximations and are not geodesically exact.

use serde::{Deserialize, Serialize};

use crate::constants::{
    METERS_PER_DEGREE_LAT, MIN_BOUNDS_METERS, MIN_POLYGON_POINTS, SQ_METERS_PER_HECTARE,
    SQ_METERS_PER_SQ_KM,
};
use crate::Point;

/// Extent of a polygon in degrees and projected meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsMetrics {
    pub width_meters: f64,
    pub height_meters: f64,
    pub aspect_ratio: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Axis-aligned lat/lng rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLngBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

fn meters_per_degree_lng(at_lat: f64) -> f64 {
    METERS_PER_DEGREE_LAT * at_lat.to_radians().cos()
}

/// Area enclosed by `points`, in square meters.
///
/// The ring is closed implicitly (last point connects to the first). Fewer than
/// three points enclose nothing and yield `0.0`. The result is never negative.
#[must_use]
pub fn compute_polygon_area(points: &[Point]) -> f64 {
    if points.len() < MIN_POLYGON_POINTS {
        return 0.0;
    }
    let origin = points[0];
    let lng_scale = meters_per_degree_lng(origin.lat);
    let project = |p: &Point| {
        ((p.lng - origin.lng) * lng_scale, (p.lat - origin.lat) * METERS_PER_DEGREE_LAT)
    };

    let mut twice_area = 0.0;
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        let (x1, y1) = project(current);
        let (x2, y2) = project(next);
        twice_area += x1 * y2 - x2 * y1;
    }
    (twice_area / 2.0).abs()
}

/// Bounding box of `points` with its projected size.
///
/// Returns `None` for fewer than three points. Width and height are floored at
/// [`MIN_BOUNDS_METERS`] so `aspect_ratio` is always finite.
#[must_use]
pub fn compute_bounds_meters(points: &[Point]) -> Option<BoundsMetrics> {
    if points.len() < MIN_POLYGON_POINTS {
        return None;
    }
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lng = f64::INFINITY;
    let mut max_lng = f64::NEG_INFINITY;
    for p in points {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lng = min_lng.min(p.lng);
        max_lng = max_lng.max(p.lng);
    }

    let center_lat = (min_lat + max_lat) / 2.0;
    let width_meters = ((max_lng - min_lng) * meters_per_degree_lng(center_lat))
        .abs()
        .max(MIN_BOUNDS_METERS);
    let height_meters = ((max_lat - min_lat) * METERS_PER_DEGREE_LAT).max(MIN_BOUNDS_METERS);

    Some(BoundsMetrics {
        width_meters,
        height_meters,
        aspect_ratio: width_meters / height_meters,
        min_lat,
        max_lat,
        min_lng,
        max_lng,
    })
}

/// Grows each edge by `fraction` of its axis' span. Negative fractions are treated as zero.
#[must_use]
pub fn expand_bounds(metrics: &BoundsMetrics, fraction: f64) -> LatLngBounds {
    let fraction = fraction.max(0.0);
    let lat_pad = (metrics.max_lat - metrics.min_lat) * fraction;
    let lng_pad = (metrics.max_lng - metrics.min_lng) * fraction;
    LatLngBounds {
        min_lat: metrics.min_lat - lat_pad,
        max_lat: metrics.max_lat + lat_pad,
        min_lng: metrics.min_lng - lng_pad,
        max_lng: metrics.max_lng + lng_pad,
    }
}

/// Human-readable area: square meters, hectares or square kilometers by magnitude.
#[must_use]
pub fn format_area(square_meters: f64) -> String {
    if square_meters < SQ_METERS_PER_HECTARE {
        format!("{square_meters:.1} m²")
    } else if square_meters < SQ_METERS_PER_SQ_KM {
        format!("{:.2} ha", square_meters / SQ_METERS_PER_HECTARE)
    } else {
        format!("{:.3} km²", square_meters / SQ_METERS_PER_SQ_KM)
    }
}
