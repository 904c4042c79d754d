//! Error types for voltgrid

use thiserror::Error;
use voltgrid_geo::GeoError;

#[derive(Debug, Error)]
pub enum VoltgridError {
    // Geometry errors
    #[error(transparent)]
    Geo(#[from] GeoError),

    // Merge errors
    #[error("Unknown country code '{country_code}': no source priority configured")]
    UnknownCountry { country_code: String },

    #[error("Refusing to merge an empty cluster")]
    EmptyCluster,

    #[error("No cluster member carries coordinates (members: {source_ids})")]
    MissingGeometry { source_ids: String },

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VoltgridError>;
