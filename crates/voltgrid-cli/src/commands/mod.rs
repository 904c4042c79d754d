//! Command implementations

mod db;
mod merge;
mod status;

use crate::cli::{Cli, Commands};
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Merge(args) => merge::execute(args).await,
        Commands::Status(args) => status::execute(args).await,
        Commands::Db(args) => db::execute(args).await,
    }
}
