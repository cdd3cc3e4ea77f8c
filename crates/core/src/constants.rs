//! Shared numeric constants for the geometry engine and its callers.

/// Meters spanned by one degree of latitude under the equirectangular approximation.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Minimum width/height reported by bounds computation, in meters.
/// Keeps aspect ratios finite for degenerate (collinear or repeated) polygons.
pub const MIN_BOUNDS_METERS: f64 = 10.0;

/// Fraction of each axis' span added on every side when padding bounds for display.
pub const DEFAULT_BOUNDS_PADDING: f64 = 0.15;

/// Fewest points that enclose an area.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Square meters in one hectare.
pub const SQ_METERS_PER_HECTARE: f64 = 10_000.0;

/// Square meters in one square kilometer.
pub const SQ_METERS_PER_SQ_KM: f64 = 1_000_000.0;
