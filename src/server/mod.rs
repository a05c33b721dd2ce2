//! Web server exposing the map layers as GeoJSON.
//!
//! Provides:
//! - `GET {prefix}/buildings`, `{prefix}/zoning`, `{prefix}/parcels` filtered by bounding box
//! - `GET /` and `GET /health` liveness checks
//! - An open CORS policy for browser map clients

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::repository::{FeatureStore, PgFeatureStore};
use crate::service::GeoQueryService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: GeoQueryService,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let store = PgFeatureStore::new(settings)?;
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Build state around any store implementation.
    pub fn with_store(store: Arc<dyn FeatureStore>) -> Self {
        Self {
            service: GeoQueryService::new(store),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state, &settings.path_prefix);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!(
        database = %settings.redacted_database_url(),
        prefix = %settings.path_prefix,
        "Starting server at http://{}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::models::{BoundingBox, Layer};
    use crate::repository::StoreError;

    /// Store that records every call and answers with a fixed result.
    struct RecordingStore {
        calls: AtomicUsize,
        last: Mutex<Option<(Layer, BoundingBox, usize)>>,
        response: Result<Option<Value>, String>,
    }

    impl RecordingStore {
        fn answering(response: Result<Option<Value>, String>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
                response,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FeatureStore for RecordingStore {
        async fn fetch_collection(
            &self,
            layer: Layer,
            bbox: &BoundingBox,
            limit: usize,
        ) -> Result<Option<Value>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((layer, *bbox, limit));
            self.response.clone().map_err(StoreError::Connect)
        }
    }

    fn app_with(store: Arc<RecordingStore>, prefix: &str) -> axum::Router {
        create_router(AppState::with_store(store), prefix)
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn sample_buildings() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": 1,
                    "geometry": {"type": "Polygon", "coordinates": [[[-122.335, 47.608], [-122.334, 47.608], [-122.334, 47.609], [-122.335, 47.608]]]},
                    "properties": {"pin": "0942000640", "use": "Retail", "zoning": "DMC 240/290-440", "status": "Compliant"}
                },
                {
                    "type": "Feature",
                    "id": 2,
                    "geometry": {"type": "Polygon", "coordinates": [[[-122.331, 47.606], [-122.330, 47.606], [-122.330, 47.607], [-122.331, 47.606]]]},
                    "properties": {"pin": "0942000655", "use": "Warehouse", "zoning": "DMC 240/290-440", "status": "Conflict"}
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_health_at_root_and_health_path() {
        let store = RecordingStore::answering(Ok(None));
        for uri in ["/", "/health"] {
            let (status, json) = get(app_with(store.clone(), ""), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["status"], "Online");
        }
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_buildings_forwards_collection() {
        let store = RecordingStore::answering(Ok(Some(sample_buildings())));
        let (status, json) = get(
            app_with(store.clone(), ""),
            "/buildings?min_lon=-122.34&min_lat=47.60&max_lon=-122.32&max_lat=47.62",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, sample_buildings());
        for feature in json["features"].as_array().unwrap() {
            let status = feature["properties"]["status"].as_str().unwrap();
            assert!(status == "Compliant" || status == "Conflict");
        }

        let (layer, bbox, limit) = store.last.lock().unwrap().expect("store was queried");
        assert_eq!(layer, Layer::Buildings);
        assert_eq!(bbox, BoundingBox::new(-122.34, 47.60, -122.32, 47.62).unwrap());
        assert_eq!(limit, 1000);
    }

    #[tokio::test]
    async fn test_box_without_data_is_empty_collection() {
        let store = RecordingStore::answering(Ok(Some(
            json!({"type": "FeatureCollection", "features": []}),
        )));
        let (status, json) = get(
            app_with(store, ""),
            "/zoning?min_lon=0&min_lat=0&max_lon=0.001&max_lat=0.001",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"type": "FeatureCollection", "features": []}));
    }

    #[tokio::test]
    async fn test_malformed_param_is_rejected_before_query() {
        let store = RecordingStore::answering(Ok(None));
        let (status, json) = get(
            app_with(store.clone(), ""),
            "/parcels?min_lon=abc&min_lat=0&max_lon=1&max_lat=1",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!json["error"].as_str().unwrap().is_empty());
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_param_is_rejected_before_query() {
        let store = RecordingStore::answering(Ok(None));
        let (status, _) = get(
            app_with(store.clone(), ""),
            "/buildings?min_lon=0&min_lat=0&max_lon=1",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_finite_param_is_rejected_before_query() {
        let store = RecordingStore::answering(Ok(None));
        let (status, json) = get(
            app_with(store.clone(), ""),
            "/zoning?min_lon=0&min_lat=NaN&max_lon=1&max_lat=inf",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "min_lat must be a finite number, got NaN");
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_ok_collection() {
        let store = RecordingStore::answering(Err("could not connect to server".to_string()));
        let (status, json) = get(
            app_with(store.clone(), ""),
            "/parcels?min_lon=-122.4&min_lat=47.5&max_lon=-122.2&max_lat=47.7",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"], json!([]));
        assert_eq!(
            json["error"],
            "connection failed: could not connect to server"
        );
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_layers_served_under_prefix() {
        let store = RecordingStore::answering(Ok(None));
        let (status, json) = get(
            app_with(store.clone(), "/api"),
            "/api/zoning?min_lon=0&min_lat=0&max_lon=1&max_lat=1",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"type": "FeatureCollection", "features": []}));

        let (status, _) = get(
            app_with(store.clone(), "/api"),
            "/zoning?min_lon=0&min_lat=0&max_lon=1&max_lat=1",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(app_with(store, "/api"), "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let store = RecordingStore::answering(Ok(None));
        let response = app_with(store, "")
            .oneshot(
                Request::builder()
                    .uri("/zoning?min_lon=0&min_lat=0&max_lon=1&max_lat=1")
                    .header(header::ORIGIN, "https://maps.example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let store = RecordingStore::answering(Ok(None));
        let response = app_with(store.clone(), "")
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/buildings")
                    .header(header::ORIGIN, "https://maps.example.org")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
        assert_eq!(store.calls(), 0);
    }
}
