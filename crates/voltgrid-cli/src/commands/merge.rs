//! Merge command implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use voltgrid_core::config::{CliOverrides, MergeConfig};
use voltgrid_merge::StationMerger;
use voltgrid_store::{PostgresConfig, PostgresStore, StationStore};

use crate::cli::MergeArgs;
use crate::progress;

pub async fn execute(args: MergeArgs) -> Result<()> {
    let mut config = MergeConfig::with_defaults();
    if let Some(path) = &args.config {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
    }
    config = config.load_from_env().apply_cli_overrides(&CliOverrides {
        search_radius_m: args.radius_m,
    });

    let pg = match &args.database_url {
        Some(url) => PostgresConfig::new(url.clone()),
        None => PostgresConfig::from_env()
            .context("Failed to load database configuration. Ensure DATABASE_URL is set.")?,
    };
    let store = PostgresStore::new(pg)
        .await
        .context("Failed to connect to database")?;
    let store: Arc<dyn StationStore> = Arc::new(store);

    tracing::info!(
        country = %args.country,
        radius_m = config.search_radius_m.value,
        radius_source = ?config.search_radius_m.source,
        "starting merge"
    );
    let merger = StationMerger::new(store, config, &args.country)?;

    let report = if args.quiet {
        merger.run().await?
    } else {
        let bar = progress::merge_bar(&args.country);
        let report = merger
            .run_with_progress(|done, total| {
                bar.set_length(total);
                bar.set_position(done);
            })
            .await;
        match &report {
            Ok(_) => progress::finish_success(&bar, "merge run finished"),
            Err(_) => progress::finish_error(&bar, "merge run failed"),
        }
        report?
    };

    println!(
        "{}: {} seeds, {} clusters committed, {} duplicates absorbed, {} already absorbed, {} failed",
        args.country.to_uppercase(),
        report.seeds_processed,
        report.clusters_committed,
        report.duplicates_absorbed,
        report.skipped_already_absorbed,
        report.failures,
    );
    if report.failures > 0 {
        tracing::error!(failures = report.failures, "merge run left failed clusters behind");
        anyhow::bail!("{} cluster(s) failed to commit, rerun to retry them", report.failures);
    }
    Ok(())
}
