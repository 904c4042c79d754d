//! Canonical merged-station records and their provenance rows.

use serde::{Deserialize, Serialize};
use voltgrid_geo::StationPoint;

use super::station::StationId;

/// Prefix of every synthesized merged-station source identifier.
pub const MERGED_SOURCE_ID_PREFIX: &str = "MERGED_";

/// The single canonical record synthesized from a duplicate cluster.
///
/// `source_id` is `MERGED_` followed by the member source identifiers,
/// comma-joined in discovery order; `data_source` is the sorted-unique,
/// comma-joined list of member source names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedStation {
    pub country_code: String,
    pub source_id: String,
    pub data_source: String,
    pub point: Option<StationPoint>,
    pub operator: Option<String>,
    pub payment: Option<String>,
    pub authentication: Option<String>,
    /// Always true; merged records never re-enter candidate queries.
    pub is_merged: bool,
}

/// Provenance row linking a merged station back to one member station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedStationSource {
    pub station_id: StationId,
    pub source_id: String,
}
