use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// VoltGrid - EV charging-station registry and merge engine
#[derive(Parser, Debug)]
#[command(name = "voltgrid")]
#[command(about = "EV charging-station registry and merge engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge duplicate stations for one country
    Merge(MergeArgs),

    /// Show station counts for one country
    Status(StatusArgs),

    /// Manage database operations
    Db(DbArgs),
}

#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// ISO 3166-1 alpha-2 country code (e.g. DE, FR, GB)
    pub country: String,

    /// Search radius around each station in metres
    #[arg(long)]
    pub radius_m: Option<f64>,

    /// Path to a TOML config file with merge thresholds
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Database connection string (defaults to DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Suppress the progress bar
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// ISO 3166-1 alpha-2 country code
    pub country: String,
}

#[derive(Parser, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommand,
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Apply pending schema migrations
    Migrate,
    /// Check database connectivity
    Ping,
}
