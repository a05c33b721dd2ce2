//! Bounding-box query parameter extraction.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::models::BoundingBox;

/// Raw query string shape; serde rejects missing or non-numeric values.
#[derive(Debug, Deserialize)]
struct BboxParams {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

/// 400 response for a missing, malformed, or non-finite coordinate.
#[derive(Debug)]
pub struct BboxRejection(pub String);

impl IntoResponse for BboxRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": self.0 })),
        )
            .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BoundingBox
where
    S: Send + Sync,
{
    type Rejection = BboxRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<BboxParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| BboxRejection(e.body_text()))?;

        BoundingBox::new(params.min_lon, params.min_lat, params.max_lon, params.max_lat)
            .map_err(|e| BboxRejection(e.to_string()))
    }
}
