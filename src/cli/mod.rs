//! Command-line interface.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod serve;

use clap::{Parser, Subcommand};

use crate::config::{Settings, DATABASE_URL_ENV};

#[derive(Parser)]
#[command(name = "zoning-api")]
#[command(about = "GeoJSON API for zoning, parcel, and building-footprint data")]
#[command(version)]
pub struct Cli {
    /// PostgreSQL/PostGIS connection string
    #[arg(long, global = true, env = DATABASE_URL_ENV, hide_env_values = true)]
    database_url: Option<String>,

    /// Connect without TLS and do not force sslmode (local development only)
    #[arg(long, global = true)]
    no_tls: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default: 127.0.0.1:8000)
        #[arg(default_value = "127.0.0.1:8000")]
        bind: String,
        /// Path prefix for the layer endpoints (e.g. /api)
        #[arg(long, default_value = "")]
        prefix: String,
    },

    /// Check database connectivity and PostGIS availability
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(database_url) = cli.database_url.as_deref() else {
        anyhow::bail!(
            "No database configured. Set {} or pass --database-url.",
            DATABASE_URL_ENV
        );
    };

    match cli.command {
        Commands::Serve { bind, prefix } => {
            let settings = Settings::new(database_url, cli.no_tls, &prefix);
            serve::cmd_serve(&settings, &bind).await
        }
        Commands::Check => {
            let settings = Settings::new(database_url, cli.no_tls, "");
            check::cmd_check(&settings).await
        }
    }
}
