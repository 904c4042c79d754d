//! Sequential merge run over one country partition.
//!
//! One seed station is fully resolved (query, match, merge, commit) before
//! the next begins; each commit changes what the next radius query sees,
//! so correctness depends on this strict sequencing. The commit itself is
//! one scoped transaction per cluster, and a failed cluster never stops
//! the run.

use std::sync::Arc;

use voltgrid_core::config::MergeConfig;
use voltgrid_core::error::{Result, VoltgridError};
use voltgrid_core::models::{StationId, StationSeed};
use voltgrid_store::StationStore;

use crate::finder::DuplicateFinder;
use crate::resolver::MergeResolver;

/// Summary of one merge run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Seed stations taken from the candidate list.
    pub seeds_processed: u64,
    /// Clusters committed, including single-member clusters.
    pub clusters_committed: u64,
    /// Confirmed duplicates absorbed into clusters (seed stations not
    /// counted).
    pub duplicates_absorbed: u64,
    /// Seeds skipped because an earlier cluster in the run absorbed them.
    pub skipped_already_absorbed: u64,
    /// Clusters whose commit or resolution failed and was rolled back.
    pub failures: u64,
}

enum SeedOutcome {
    Merged { duplicates: u64 },
    AlreadyAbsorbed,
}

/// Drives deduplication for one country partition.
pub struct StationMerger {
    store: Arc<dyn StationStore>,
    config: MergeConfig,
    country_code: String,
}

impl StationMerger {
    /// Create a merger for one country. Fails fast on an invalid
    /// configuration or a country code with no configured source
    /// priorities; the run never starts in that case.
    pub fn new(
        store: Arc<dyn StationStore>,
        config: MergeConfig,
        country_code: &str,
    ) -> Result<Self> {
        config.validate()?;
        let country_code = country_code.trim().to_uppercase();
        if !config.sources.is_known_country(&country_code) {
            return Err(VoltgridError::UnknownCountry { country_code });
        }
        Ok(Self { store, config, country_code })
    }

    pub async fn run(&self) -> Result<MergeReport> {
        self.run_with_progress(|_, _| {}).await
    }

    /// Run the merge, reporting `(processed, total)` seed progress after
    /// each station.
    pub async fn run_with_progress<F>(&self, mut progress: F) -> Result<MergeReport>
    where
        F: FnMut(u64, u64),
    {
        let seeds = self.store.merge_candidates(&self.country_code).await?;
        let total = seeds.len() as u64;
        tracing::info!(
            country_code = %self.country_code,
            seed_count = total,
            radius_m = self.config.search_radius_m.value,
            "starting merge run"
        );

        let mut report = MergeReport::default();
        for seed in &seeds {
            report.seeds_processed += 1;
            match self.process_seed(seed).await {
                Ok(SeedOutcome::Merged { duplicates }) => {
                    report.clusters_committed += 1;
                    report.duplicates_absorbed += duplicates;
                }
                Ok(SeedOutcome::AlreadyAbsorbed) => {
                    report.skipped_already_absorbed += 1;
                }
                // Cluster-granular isolation: the transaction is rolled
                // back and the run continues with the next seed.
                Err(e) => {
                    tracing::error!(station_id = %seed.id, error = %e, "cluster merge failed");
                    report.failures += 1;
                }
            }
            progress(report.seeds_processed, total);
        }

        tracing::info!(
            country_code = %self.country_code,
            clusters = report.clusters_committed,
            duplicates = report.duplicates_absorbed,
            failures = report.failures,
            "merge run finished"
        );
        Ok(report)
    }

    async fn process_seed(&self, seed: &StationSeed) -> Result<SeedOutcome> {
        let finder = DuplicateFinder::new(self.store.as_ref(), &self.config, &self.country_code);
        let Some(found) = finder.find_duplicates(seed).await? else {
            return Ok(SeedOutcome::AlreadyAbsorbed);
        };

        let duplicates = found.duplicates.len() as u64;
        if duplicates == 0 {
            tracing::debug!(station_id = %seed.id, "no duplicates, merging seed alone");
        }

        // Discovery order: confirmed duplicates first, the seed last.
        let mut cluster = found.duplicates;
        cluster.push(found.seed);
        let member_ids: Vec<StationId> = cluster.iter().map(|m| m.id).collect();

        let resolver = MergeResolver::new(&self.config, &self.country_code);
        let (merged, provenance) = resolver.merge(&cluster)?;

        let merged_id = self.store.commit_cluster(&member_ids, &merged, &provenance).await?;
        tracing::debug!(
            station_id = %seed.id,
            merged_id = %merged_id,
            members = member_ids.len(),
            "cluster committed"
        );
        Ok(SeedOutcome::Merged { duplicates })
    }
}
