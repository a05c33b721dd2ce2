//! PostgreSQL connection helpers using rustls.
//!
//! TLS is required by default; `--no-tls` connects over plain TCP for
//! local development databases.

use std::sync::Arc;

use rustls::ClientConfig;
use tokio_postgres::Client;
use tokio_postgres_rustls::MakeRustlsConnect;

use super::StoreError;

/// Build a rustls client config trusting the platform's native roots.
pub fn build_rustls_config() -> Result<ClientConfig, StoreError> {
    let mut root_store = rustls::RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for err in &native.errors {
        tracing::warn!("Failed to load a native certificate: {}", err);
    }
    for cert in native.certs {
        root_store.add(cert).ok();
    }

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| StoreError::Tls(e.to_string()))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(config)
}

pub fn make_tls_connector(config: ClientConfig) -> MakeRustlsConnect {
    MakeRustlsConnect::new(config)
}

/// Connect to PostgreSQL and spawn the connection task.
///
/// Returns just the `Client`. The connection future runs as a background
/// tokio task and finishes once the client is dropped.
pub async fn connect(url: &str, tls: Option<&ClientConfig>) -> Result<Client, StoreError> {
    match tls {
        None => {
            let (client, connection) = tokio_postgres::connect(url, tokio_postgres::NoTls)
                .await
                .map_err(|e| StoreError::Connect(super::describe_pg_error(&e)))?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!("PostgreSQL connection error: {}", e);
                }
            });
            Ok(client)
        }
        Some(config) => {
            let tls = make_tls_connector(config.clone());
            let (client, connection) = tokio_postgres::connect(url, tls)
                .await
                .map_err(|e| StoreError::Connect(super::describe_pg_error(&e)))?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!("PostgreSQL connection error: {}", e);
                }
            });
            Ok(client)
        }
    }
}
