//! Status command implementation

use anyhow::{Context, Result};
use voltgrid_store::{PostgresConfig, PostgresStore, StationStore};

use crate::cli::StatusArgs;

pub async fn execute(args: StatusArgs) -> Result<()> {
    let pg = PostgresConfig::from_env()
        .context("Failed to load database configuration. Ensure DATABASE_URL is set.")?;
    let store = PostgresStore::new(pg)
        .await
        .context("Failed to connect to database")?;

    let country = args.country.trim().to_uppercase();
    let unmerged = store.count_stations(&country, false).await?;
    let merged = store.count_stations(&country, true).await?;

    println!("{country}: {unmerged} source stations, {merged} merged stations");
    Ok(())
}
