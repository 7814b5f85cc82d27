use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ora2pg", about = "Oracle to PostgreSQL schema migration pipeline", version = env!("CARGO_PKG_VERSION"))]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
    /// Path to a `MigrationConfig` TOML file.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,
    /// Emit every DDL statement without executing it; writes are recorded
    /// as skipped instead of created.
    #[arg(long, global = true, default_value_t = false)]
    pub(crate) dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Run every declared stage in order.
    Migrate,
    /// Submit a single Job RPC operation (`create_job` + `submit_job`).
    Job {
        /// "ORACLE" or "POSTGRES".
        #[arg(long)]
        database: String,
        /// One of the closed operation-type set for that database.
        #[arg(long)]
        operation_type: String,
    },
}
