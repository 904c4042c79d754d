//! Validated WGS84 station coordinates with WKT round-trip support.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wkt::{ToWkt, TryFromWkt};

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Coordinates out of range: longitude {lon}, latitude {lat}")]
    CoordinatesOutOfRange { lon: f64, lat: f64 },

    #[error("Invalid WKT '{text}': {reason}")]
    InvalidWkt { text: String, reason: String },
}

/// A WGS84 point as stored on a station record.
///
/// Construction validates ranges up front so invalid coordinates are
/// rejected before any spatial query is built from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationPoint {
    lon: f64,
    lat: f64,
}

impl StationPoint {
    /// Create a point, rejecting non-finite values and coordinates outside
    /// longitude [-180, 180] / latitude [-90, 90].
    pub fn new(lon: f64, lat: f64) -> Result<Self, GeoError> {
        if !lon.is_finite() || !lat.is_finite() || !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::CoordinatesOutOfRange { lon, lat });
        }
        Ok(Self { lon, lat })
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Serialize as `POINT(lon lat)`.
    pub fn to_wkt(&self) -> String {
        geo::Point::new(self.lon, self.lat).wkt_string()
    }

    /// Parse a `POINT(lon lat)` string, validating the coordinates.
    pub fn from_wkt(text: &str) -> Result<Self, GeoError> {
        let point: geo::Point<f64> =
            geo::Point::try_from_wkt_str(text).map_err(|e| GeoError::InvalidWkt {
                text: text.to_string(),
                reason: e.to_string(),
            })?;
        Self::new(point.x(), point.y())
    }
}

impl From<StationPoint> for geo::Point<f64> {
    fn from(p: StationPoint) -> Self {
        geo::Point::new(p.lon, p.lat)
    }
}
