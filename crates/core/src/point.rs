use serde::{Deserialize, Serialize};

/// Geographic coordinate in degrees. Range is not validated here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// The `(0, 0)` placeholder used when a stored point cannot be decoded.
    #[must_use]
    pub const fn zero() -> Self {
        Self { lat: 0.0, lng: 0.0 }
    }
}

/// How a point was captured.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// Recorded by an explicit user action
    #[default]
    Manual,
    /// Recorded by location polling
    Auto,
}

impl PointKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        }
    }
}

impl std::fmt::Display for PointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PointKind {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "auto" => Ok(Self::Auto),
            _ => Err(crate::CoreError::InvalidInput(format!("invalid point type: {s}"))),
        }
    }
}

/// A single recorded observation. Sequences are ordered by `captured_at_millis`
/// by convention only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedPoint {
    pub point: Point,
    #[serde(rename = "type")]
    pub kind: PointKind,
    #[serde(rename = "timestamp")]
    pub captured_at_millis: i64,
}

impl TrackedPoint {
    #[must_use]
    pub const fn new(point: Point, kind: PointKind, captured_at_millis: i64) -> Self {
        Self { point, kind, captured_at_millis }
    }

    #[must_use]
    pub const fn manual(lat: f64, lng: f64, captured_at_millis: i64) -> Self {
        Self::new(Point::new(lat, lng), PointKind::Manual, captured_at_millis)
    }

    #[must_use]
    pub const fn auto(lat: f64, lng: f64, captured_at_millis: i64) -> Self {
        Self::new(Point::new(lat, lng), PointKind::Auto, captured_at_millis)
    }
}

/// Strips capture metadata, leaving the coordinates the geometry engine works on.
#[must_use]
pub fn coordinates(points: &[TrackedPoint]) -> Vec<Point> {
    points.iter().map(|p| p.point).collect()
}
