//! Database management commands

use anyhow::{Context, Result};
use voltgrid_store::{PostgresConfig, PostgresStore};

use crate::cli::{DbArgs, DbCommand};

pub async fn execute(args: DbArgs) -> Result<()> {
    let config = PostgresConfig::from_env()
        .context("Failed to load database configuration. Ensure DATABASE_URL is set.")?;

    match args.command {
        DbCommand::Migrate => {
            tracing::info!("applying pending migrations");
            let store = PostgresStore::with_migrations(config)
                .await
                .context("Failed to apply migrations")?;
            store.health_check().await?;
            println!("Migrations applied");
        }
        DbCommand::Ping => {
            let store = PostgresStore::new(config)
                .await
                .context("Failed to connect to database")?;
            store.health_check().await?;
            println!("Database reachable");
        }
    }
    Ok(())
}
