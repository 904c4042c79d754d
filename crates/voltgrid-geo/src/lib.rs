//! Voltgrid Geo - Coordinate and geometry adapter
//!
//! This crate is the only component that touches geospatial types. It wraps
//! point construction and WKT round-trips, and evaluates distances in a
//! geodesic (ellipsoidal-surface) metric.

pub mod distance;
pub mod point;

pub use distance::{geodesic_distance_m, within_radius};
pub use point::{GeoError, StationPoint};

/// WGS 84, the only CRS station coordinates are stored in.
pub const WGS84_SRID: u32 = 4326;
