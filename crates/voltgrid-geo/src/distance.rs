//! Geodesic distance between station points.
//!
//! Distances are always evaluated on the ellipsoid, never in a flat
//! projection. Projecting WGS84 to Mercator before measuring overstates
//! distance badly at station latitudes: the same Munich pair reads about
//! 4.2 km projected but 2.8 km on the ellipsoid. Duplicate radii are tens
//! of metres, so the projected error would dwarf the search radius itself.

use geo::{Distance, Geodesic, Point};

use crate::point::StationPoint;

/// Geodesic distance between two points in metres.
pub fn geodesic_distance_m(a: &StationPoint, b: &StationPoint) -> f64 {
    let a: Point<f64> = (*a).into();
    let b: Point<f64> = (*b).into();
    Geodesic.distance(a, b)
}

/// Whether `b` lies within `radius_m` metres of `a`.
pub fn within_radius(a: &StationPoint, b: &StationPoint, radius_m: f64) -> bool {
    geodesic_distance_m(a, b) <= radius_m
}
