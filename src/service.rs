//! Layer query service.
//!
//! Turns a store result into a response the map client can always parse:
//! either the database's FeatureCollection (capped at the layer ceiling) or
//! an empty collection with a diagnostic.

use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::models::{BoundingBox, FeatureCollection, Layer};
use crate::repository::FeatureStore;

/// Result of a layer query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The query ran; the value is a FeatureCollection, possibly empty.
    Collection(Value),
    /// The query failed; the caller gets an empty collection and this message.
    Degraded { error: String },
}

impl QueryOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, QueryOutcome::Degraded { .. })
    }
}

/// Both variants answer 200; only the `error` field tells them apart.
impl IntoResponse for QueryOutcome {
    fn into_response(self) -> Response {
        match self {
            QueryOutcome::Collection(value) => Json(value).into_response(),
            QueryOutcome::Degraded { error } => {
                Json(FeatureCollection::degraded(error)).into_response()
            }
        }
    }
}

fn empty_collection() -> Value {
    serde_json::json!({ "type": "FeatureCollection", "features": [] })
}

/// Runs layer queries against a store.
#[derive(Clone)]
pub struct GeoQueryService {
    store: Arc<dyn FeatureStore>,
}

impl GeoQueryService {
    pub fn new(store: Arc<dyn FeatureStore>) -> Self {
        Self { store }
    }

    pub async fn query(&self, layer: Layer, bbox: &BoundingBox) -> QueryOutcome {
        let limit = layer.max_features();

        match self.store.fetch_collection(layer, bbox, limit).await {
            Ok(Some(value)) if !value.is_null() => {
                QueryOutcome::Collection(cap_features(layer, value, limit))
            }
            Ok(_) => {
                tracing::debug!(%layer, "store returned no collection, substituting empty");
                QueryOutcome::Collection(empty_collection())
            }
            Err(e) => {
                tracing::warn!(%layer, error = %e, "layer query failed, returning empty collection");
                QueryOutcome::Degraded {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Truncate a collection's `features` to `limit`, normalizing a missing or
/// null array to `[]`. Anything that is not a JSON object is discarded.
fn cap_features(layer: Layer, mut value: Value, limit: usize) -> Value {
    let Some(obj) = value.as_object_mut() else {
        tracing::warn!(%layer, "store returned a non-object collection, substituting empty");
        return empty_collection();
    };

    match obj.get_mut("features") {
        Some(Value::Array(features)) => {
            if features.len() > limit {
                tracing::warn!(
                    %layer,
                    returned = features.len(),
                    limit,
                    "store exceeded feature ceiling, truncating"
                );
                features.truncate(limit);
            }
        }
        _ => {
            obj.insert("features".to_string(), Value::Array(Vec::new()));
        }
    }

    value
}
