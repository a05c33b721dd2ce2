//! Spatial database access.
//!
//! `FeatureStore` is the seam between the query service and PostgreSQL:
//! it runs one layer query for one bounding box and hands back whatever
//! JSON the database produced. `PgFeatureStore` is the PostGIS-backed
//! implementation; tests substitute in-memory fakes.

pub mod pg_tls;
pub mod queries;

use std::error::Error as _;

use async_trait::async_trait;
use rustls::ClientConfig;
use thiserror::Error;

use crate::config::Settings;
use crate::models::{BoundingBox, Layer};

/// Errors raised while talking to the spatial database.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Source of layer FeatureCollections.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Run the layer query for `bbox`, returning at most `limit` features.
    ///
    /// `Ok(None)` means the database returned no row or a NULL value.
    async fn fetch_collection(
        &self,
        layer: Layer,
        bbox: &BoundingBox,
        limit: usize,
    ) -> Result<Option<serde_json::Value>, StoreError>;
}

/// PostGIS-backed store opening one connection per query.
pub struct PgFeatureStore {
    database_url: String,
    tls: Option<ClientConfig>,
}

impl PgFeatureStore {
    pub fn new(settings: &Settings) -> Result<Self, StoreError> {
        let tls = if settings.no_tls {
            None
        } else {
            Some(pg_tls::build_rustls_config()?)
        };

        Ok(Self {
            database_url: settings.database_url.clone(),
            tls,
        })
    }

    /// Report the PostGIS version, failing when the extension is missing.
    pub async fn postgis_version(&self) -> Result<String, StoreError> {
        let client = pg_tls::connect(&self.database_url, self.tls.as_ref()).await?;
        let row = client
            .query_one("SELECT PostGIS_Full_Version()", &[])
            .await
            .map_err(|e| StoreError::Query(describe_pg_error(&e)))?;
        row.try_get::<_, String>(0)
            .map_err(|e| StoreError::Query(describe_pg_error(&e)))
    }
}

#[async_trait]
impl FeatureStore for PgFeatureStore {
    async fn fetch_collection(
        &self,
        layer: Layer,
        bbox: &BoundingBox,
        limit: usize,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        // The client (and with it the connection) is dropped on every return path.
        let client = pg_tls::connect(&self.database_url, self.tls.as_ref()).await?;

        let sql = queries::layer_sql(layer);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let row = client
            .query_opt(
                sql.as_str(),
                &[
                    &bbox.min_lon,
                    &bbox.min_lat,
                    &bbox.max_lon,
                    &bbox.max_lat,
                    &limit,
                ],
            )
            .await
            .map_err(|e| StoreError::Query(describe_pg_error(&e)))?;

        match row {
            Some(row) => row
                .try_get::<_, Option<serde_json::Value>>(0)
                .map_err(|e| StoreError::Query(describe_pg_error(&e))),
            None => Ok(None),
        }
    }
}

/// Render a tokio-postgres error with the server's message.
///
/// tokio_postgres::Error's Display impl just shows "db error" for database
/// errors, so dig into the source to get the actual message.
pub fn describe_pg_error(e: &tokio_postgres::Error) -> String {
    if let Some(db_err) = e.as_db_error() {
        format!(
            "{}: {}{}{}",
            db_err.severity(),
            db_err.message(),
            db_err
                .detail()
                .map(|d| format!(" DETAIL: {}", d))
                .unwrap_or_default(),
            db_err
                .hint()
                .map(|h| format!(" HINT: {}", h))
                .unwrap_or_default(),
        )
    } else {
        let mut msg = e.to_string();
        let mut source = e.source();
        while let Some(src) = source {
            msg = format!("{}: {}", msg, src);
            source = src.source();
        }
        msg
    }
}
