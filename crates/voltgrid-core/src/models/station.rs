//! Station records and their address/charging sub-records.
//!
//! Attribute absence is always `Option`, never an empty-string or zero
//! sentinel: the matcher must be able to distinguish "no operator recorded"
//! from "operator recorded as something".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use voltgrid_geo::StationPoint;

/// Database identifier of a station row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StationId(pub i64);

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Merge lifecycle flag on a station row.
///
/// `IsDuplicate` is written exactly once, when the station is absorbed into
/// a merged record. It is never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MergeStatus {
    #[default]
    None,
    IsDuplicate,
}

impl MergeStatus {
    /// Text stored in the `merge_status` column (`NULL` for `None`).
    pub fn as_db_value(&self) -> Option<&'static str> {
        match self {
            MergeStatus::None => None,
            MergeStatus::IsDuplicate => Some("is_duplicate"),
        }
    }

    pub fn from_db_value(value: Option<&str>) -> Self {
        match value {
            Some("is_duplicate") => MergeStatus::IsDuplicate,
            _ => MergeStatus::None,
        }
    }
}

/// A persisted station record, immutable once written except for
/// `is_merged` and `merge_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    /// Identifier unique within the originating source.
    pub source_id: String,
    /// Source name, e.g. `"BNA"`, `"OCM"`, `"OSM"`.
    pub data_source: String,
    pub operator: Option<String>,
    pub payment: Option<String>,
    pub authentication: Option<String>,
    pub point: Option<StationPoint>,
    pub country_code: String,
    pub date_created: Option<NaiveDate>,
    pub date_updated: Option<NaiveDate>,
    /// Raw source payload as delivered by the mapping layer.
    pub raw_data: Option<String>,
    pub is_merged: bool,
    pub merge_status: MergeStatus,
    pub address: Option<Address>,
    pub charging: Option<Charging>,
}

/// Postal address, owned by exactly one station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub town: Option<String>,
    pub postcode: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Charging equipment attributes, owned by exactly one station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Charging {
    /// Number of sockets.
    pub capacity: Option<i32>,
    /// Per-socket power ratings in kW.
    pub kw_list: Option<Vec<f64>>,
    pub socket_type_list: Option<Vec<String>>,
    pub total_kw: Option<f64>,
    pub max_kw: Option<f64>,
    pub dc_support: Option<bool>,
}

/// Outer-iteration row for a merge run: just enough to center a radius
/// query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationSeed {
    pub id: StationId,
    pub point: StationPoint,
}

/// A station as returned by a radius query: scalar attributes joined with
/// its address and charging sub-records, plus the geodesic distance to the
/// query center. Cluster members are of this type; the whole cluster is
/// consumed within one orchestration step and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStation {
    pub id: StationId,
    pub source_id: String,
    pub data_source: String,
    pub operator: Option<String>,
    pub payment: Option<String>,
    pub authentication: Option<String>,
    pub point: StationPoint,
    pub address: Option<Address>,
    pub charging: Option<Charging>,
    /// Geodesic distance to the seed station in metres.
    pub distance_m: f64,
}

impl NearbyStation {
    /// Socket count, if the charging sub-record carries one.
    pub fn capacity(&self) -> Option<i32> {
        self.charging.as_ref().and_then(|c| c.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_status_db_round_trip() {
        assert_eq!(MergeStatus::None.as_db_value(), None);
        assert_eq!(MergeStatus::IsDuplicate.as_db_value(), Some("is_duplicate"));
        assert_eq!(MergeStatus::from_db_value(None), MergeStatus::None);
        assert_eq!(
            MergeStatus::from_db_value(Some("is_duplicate")),
            MergeStatus::IsDuplicate
        );
    }
}
