//! In-memory storage implementation for development and testing.
//!
//! This implementation uses `RwLock::unwrap()` intentionally. Lock
//! poisoning only occurs when another thread panicked while holding the
//! lock, which is an unrecoverable state. For production workloads, use
//! the PostgreSQL backend.
//!
//! `commit_cluster` mutates under one write lock, so the read-after-write
//! visibility contract of `StationStore` holds trivially; an injected
//! failure returns before any mutation, which stands in for a rolled-back
//! transaction.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use voltgrid_core::error::{Result, VoltgridError};
use voltgrid_core::models::{
    MergeStatus, MergedStation, MergedStationSource, NearbyStation, Station, StationId,
    StationSeed,
};
use voltgrid_geo::{geodesic_distance_m, StationPoint};

use crate::ports::StationStore;

/// In-memory implementation of StationStore
#[derive(Debug, Clone, Default)]
pub struct MemoryStationStore {
    stations: Arc<RwLock<BTreeMap<StationId, Station>>>,
    provenance: Arc<RwLock<Vec<(StationId, Vec<MergedStationSource>)>>>,
    next_id: Arc<RwLock<i64>>,
    fail_commits_containing: Arc<RwLock<HashSet<StationId>>>,
}

impl MemoryStationStore {
    pub fn new() -> Self {
        Self { next_id: Arc::new(RwLock::new(1)), ..Self::default() }
    }

    /// Insert a station, assigning the next id (the field on the passed
    /// record is ignored, mirroring an autoincrement column).
    pub fn insert_station(&self, mut station: Station) -> StationId {
        let mut next_id = self.next_id.write().unwrap();
        let id = StationId(*next_id);
        *next_id += 1;
        station.id = id;
        self.stations.write().unwrap().insert(id, station);
        id
    }

    /// Make any future `commit_cluster` whose members include `id` fail
    /// without mutating state. Used to exercise failure isolation.
    pub fn fail_commits_containing(&self, id: StationId) {
        self.fail_commits_containing.write().unwrap().insert(id);
    }

    /// Snapshot of a station row, for assertions.
    pub fn station(&self, id: StationId) -> Option<Station> {
        self.stations.read().unwrap().get(&id).cloned()
    }

    /// All merged station rows together with their provenance, in commit
    /// order.
    pub fn merged_stations(&self) -> Vec<(Station, Vec<MergedStationSource>)> {
        let stations = self.stations.read().unwrap();
        self.provenance
            .read()
            .unwrap()
            .iter()
            .filter_map(|(id, sources)| {
                stations.get(id).map(|s| (s.clone(), sources.clone()))
            })
            .collect()
    }
}

#[async_trait]
impl StationStore for MemoryStationStore {
    async fn merge_candidates(&self, country_code: &str) -> Result<Vec<StationSeed>> {
        let stations = self.stations.read().unwrap();
        Ok(stations
            .values()
            .filter(|s| {
                s.country_code == country_code
                    && !s.is_merged
                    && s.merge_status != MergeStatus::IsDuplicate
            })
            .filter_map(|s| s.point.map(|point| StationSeed { id: s.id, point }))
            .collect())
    }

    async fn stations_within_radius(
        &self,
        center: &StationPoint,
        radius_m: f64,
        country_code: &str,
    ) -> Result<Vec<NearbyStation>> {
        let stations = self.stations.read().unwrap();
        Ok(stations
            .values()
            .filter(|s| {
                s.country_code == country_code
                    && !s.is_merged
                    && s.merge_status != MergeStatus::IsDuplicate
            })
            .filter_map(|s| {
                let point = s.point?;
                let distance_m = geodesic_distance_m(center, &point);
                (distance_m <= radius_m).then(|| NearbyStation {
                    id: s.id,
                    source_id: s.source_id.clone(),
                    data_source: s.data_source.clone(),
                    operator: s.operator.clone(),
                    payment: s.payment.clone(),
                    authentication: s.authentication.clone(),
                    point,
                    address: s.address.clone(),
                    charging: s.charging.clone(),
                    distance_m,
                })
            })
            .collect())
    }

    async fn commit_cluster(
        &self,
        member_ids: &[StationId],
        merged: &MergedStation,
        provenance: &[MergedStationSource],
    ) -> Result<StationId> {
        {
            let poisoned = self.fail_commits_containing.read().unwrap();
            if member_ids.iter().any(|id| poisoned.contains(id)) {
                return Err(VoltgridError::Storage(
                    "injected commit failure, transaction rolled back".to_string(),
                ));
            }
        }

        // Same lock order as insert_station
        let mut next_id = self.next_id.write().unwrap();
        let merged_id = StationId(*next_id);
        *next_id += 1;

        let mut stations = self.stations.write().unwrap();
        for id in member_ids {
            if let Some(station) = stations.get_mut(id) {
                station.merge_status = MergeStatus::IsDuplicate;
            }
        }
        stations.insert(
            merged_id,
            Station {
                id: merged_id,
                source_id: merged.source_id.clone(),
                data_source: merged.data_source.clone(),
                operator: merged.operator.clone(),
                payment: merged.payment.clone(),
                authentication: merged.authentication.clone(),
                point: merged.point,
                country_code: merged.country_code.clone(),
                date_created: None,
                date_updated: None,
                raw_data: None,
                is_merged: true,
                merge_status: MergeStatus::None,
                address: None,
                charging: None,
            },
        );
        self.provenance.write().unwrap().push((merged_id, provenance.to_vec()));
        Ok(merged_id)
    }

    async fn count_stations(&self, country_code: &str, merged: bool) -> Result<u64> {
        let stations = self.stations.read().unwrap();
        Ok(stations
            .values()
            .filter(|s| s.country_code == country_code && s.is_merged == merged)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(source_id: &str, lon: f64, lat: f64) -> Station {
        Station {
            id: StationId(0),
            source_id: source_id.to_string(),
            data_source: "OSM".to_string(),
            operator: None,
            payment: None,
            authentication: None,
            point: Some(StationPoint::new(lon, lat).unwrap()),
            country_code: "DE".to_string(),
            date_created: None,
            date_updated: None,
            raw_data: None,
            is_merged: false,
            merge_status: MergeStatus::None,
            address: None,
            charging: None,
        }
    }

    #[tokio::test]
    async fn radius_query_filters_by_distance_and_country() {
        let store = MemoryStationStore::new();
        let a = store.insert_station(station("A", 11.4717, 48.1548));
        store.insert_station(station("B", 11.4718, 48.1548));
        // ~5 km away
        store.insert_station(station("C", 11.54, 48.15));
        let mut foreign = station("D", 11.4717, 48.1548);
        foreign.country_code = "FR".to_string();
        store.insert_station(foreign);

        let center = StationPoint::new(11.4717, 48.1548).unwrap();
        let nearby = store.stations_within_radius(&center, 100.0, "DE").await.unwrap();
        assert_eq!(nearby.len(), 2);
        assert_eq!(nearby[0].id, a);
        assert_eq!(nearby[0].distance_m, 0.0);
    }

    #[tokio::test]
    async fn stations_without_coordinates_are_invisible() {
        let store = MemoryStationStore::new();
        let mut s = station("A", 0.0, 0.0);
        s.point = None;
        store.insert_station(s);

        assert!(store.merge_candidates("DE").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn committed_members_leave_candidate_sets() {
        let store = MemoryStationStore::new();
        let a = store.insert_station(station("A", 11.4717, 48.1548));

        let merged = MergedStation {
            country_code: "DE".to_string(),
            source_id: "MERGED_A".to_string(),
            data_source: "OSM".to_string(),
            point: Some(StationPoint::new(11.4717, 48.1548).unwrap()),
            operator: None,
            payment: None,
            authentication: None,
            is_merged: true,
        };
        let provenance = vec![MergedStationSource { station_id: a, source_id: "A".to_string() }];
        store.commit_cluster(&[a], &merged, &provenance).await.unwrap();

        assert!(store.merge_candidates("DE").await.unwrap().is_empty());
        let center = StationPoint::new(11.4717, 48.1548).unwrap();
        assert!(store.stations_within_radius(&center, 100.0, "DE").await.unwrap().is_empty());
        assert_eq!(store.count_stations("DE", true).await.unwrap(), 1);
        assert_eq!(store.station(a).unwrap().merge_status, MergeStatus::IsDuplicate);
    }

    #[tokio::test]
    async fn injected_commit_failure_leaves_state_untouched() {
        let store = MemoryStationStore::new();
        let a = store.insert_station(station("A", 11.4717, 48.1548));
        store.fail_commits_containing(a);

        let merged = MergedStation {
            country_code: "DE".to_string(),
            source_id: "MERGED_A".to_string(),
            data_source: "OSM".to_string(),
            point: Some(StationPoint::new(11.4717, 48.1548).unwrap()),
            operator: None,
            payment: None,
            authentication: None,
            is_merged: true,
        };
        let provenance = vec![MergedStationSource { station_id: a, source_id: "A".to_string() }];
        assert!(store.commit_cluster(&[a], &merged, &provenance).await.is_err());

        assert_eq!(store.station(a).unwrap().merge_status, MergeStatus::None);
        assert!(store.merged_stations().is_empty());
        assert_eq!(store.merge_candidates("DE").await.unwrap().len(), 1);
    }
}
