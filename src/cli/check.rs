//! Database connectivity check.

use console::style;

use crate::config::Settings;
use crate::repository::PgFeatureStore;

/// Connect once and report the PostGIS version.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!(
        "{} Connecting to {}",
        style("→").cyan(),
        settings.redacted_database_url()
    );

    let store = PgFeatureStore::new(settings)?;
    match store.postgis_version().await {
        Ok(version) => {
            println!("  {} PostGIS available: {}", style("✓").green(), version);
            Ok(())
        }
        Err(e) => {
            eprintln!("  {} {}", style("✗").red(), e);
            Err(anyhow::anyhow!(
                "Database check failed. The server needs PostgreSQL with PostGIS \
                 (CREATE EXTENSION IF NOT EXISTS postgis)."
            ))
        }
    }
}
