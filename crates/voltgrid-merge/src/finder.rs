//! Radius search plus per-candidate matching.

use voltgrid_core::config::MergeConfig;
use voltgrid_core::error::Result;
use voltgrid_core::models::{NearbyStation, StationSeed};
use voltgrid_store::StationStore;

use crate::matcher;

/// Result of a duplicate search around one seed station: the confirmed
/// duplicates plus the seed's own fully-joined record.
#[derive(Debug, Clone)]
pub struct FoundDuplicates {
    pub duplicates: Vec<NearbyStation>,
    pub seed: NearbyStation,
}

/// Finds the confirmed duplicates of a seed station.
pub struct DuplicateFinder<'a> {
    store: &'a dyn StationStore,
    config: &'a MergeConfig,
    country_code: &'a str,
}

impl<'a> DuplicateFinder<'a> {
    pub fn new(store: &'a dyn StationStore, config: &'a MergeConfig, country_code: &'a str) -> Self {
        Self { store, config, country_code }
    }

    /// Query all unmerged, not-yet-flagged stations within the configured
    /// radius of the seed and run each through the attribute matcher.
    ///
    /// Returns `None` when the seed itself is no longer visible, which
    /// means an earlier cluster in the same run absorbed it after the seed
    /// list was taken; such a seed must not be reprocessed.
    pub async fn find_duplicates(&self, seed: &StationSeed) -> Result<Option<FoundDuplicates>> {
        let nearby = self
            .store
            .stations_within_radius(
                &seed.point,
                self.config.search_radius_m.value,
                self.country_code,
            )
            .await?;

        let Some(seed_record) = nearby.iter().find(|s| s.id == seed.id).cloned() else {
            tracing::debug!(station_id = %seed.id, "seed already absorbed, skipping");
            return Ok(None);
        };

        let duplicates = nearby
            .into_iter()
            .filter(|candidate| candidate.id != seed.id)
            .filter(|candidate| {
                matcher::is_duplicate(&seed_record, candidate, candidate.distance_m, self.config)
            })
            .collect();

        Ok(Some(FoundDuplicates { duplicates, seed: seed_record }))
    }
}
