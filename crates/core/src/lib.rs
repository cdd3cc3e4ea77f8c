//! Core types and pure logic for fieldarea.
//!
//! Domain types for recorded points and saved sessions, the planar geometry engine,
//! the change-hash used for dirty tracking, and migration of persisted JSON. No I/O.

pub mod change_hash;
pub mod constants;
pub mod env_config;
mod error;
pub mod geometry;
pub mod migration;
mod point;
pub mod schema;
mod session;

pub use change_hash::hash_points;
pub use error::*;
pub use geometry::{
    compute_bounds_meters, compute_polygon_area, expand_bounds, format_area, BoundsMetrics,
    LatLngBounds,
};
pub use migration::{migrate_index, migrate_session_data};
pub use point::*;
pub use session::*;
