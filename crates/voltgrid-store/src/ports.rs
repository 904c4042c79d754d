use async_trait::async_trait;
use voltgrid_core::error::Result;
use voltgrid_core::models::{
    MergedStation, MergedStationSource, NearbyStation, StationId, StationSeed,
};
use voltgrid_geo::StationPoint;

/// Port for station storage as consumed by the merge engine.
///
/// Visibility contract: a cluster committed through `commit_cluster` must
/// be visible to every subsequent `merge_candidates` and
/// `stations_within_radius` call in the same process. The orchestrator
/// relies on this read-after-write guarantee to keep absorbed stations out
/// of later candidate sets within a single run.
///
/// Every stored station has a source id, a source name, and a country
/// code; the schema enforces this with NOT NULL constraints, and returned
/// records carry these fields unconditionally.
#[async_trait]
pub trait StationStore: Send + Sync {
    /// Seed stations for a merge run: every station of the country that is
    /// neither merged nor flagged as a duplicate and carries coordinates,
    /// ordered by ascending id.
    async fn merge_candidates(&self, country_code: &str) -> Result<Vec<StationSeed>>;

    /// All stations within `radius_m` metres of `center` in the same
    /// country partition, excluding merged and duplicate-flagged rows,
    /// joined with their address and charging attributes. Each row carries
    /// its geodesic distance to `center`. Rows without coordinates are
    /// never returned.
    async fn stations_within_radius(
        &self,
        center: &StationPoint,
        radius_m: f64,
        country_code: &str,
    ) -> Result<Vec<NearbyStation>>;

    /// Commit one duplicate cluster in a single scoped transaction: flag
    /// every member as a duplicate, insert the merged record, and insert
    /// one provenance row per member. All effects succeed or none do.
    /// Returns the id of the inserted merged record.
    async fn commit_cluster(
        &self,
        member_ids: &[StationId],
        merged: &MergedStation,
        provenance: &[MergedStationSource],
    ) -> Result<StationId>;

    /// Number of stations in the country partition, split by merged state.
    async fn count_stations(&self, country_code: &str, merged: bool) -> Result<u64>;
}
