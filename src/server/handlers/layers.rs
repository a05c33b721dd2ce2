//! Layer endpoints: one bounding box in, one FeatureCollection out.

use axum::extract::State;

use super::super::AppState;
use crate::models::{BoundingBox, Layer};
use crate::service::QueryOutcome;

/// Building footprints with zoning and compliance status.
pub async fn buildings(State(state): State<AppState>, bbox: BoundingBox) -> QueryOutcome {
    state.service.query(Layer::Buildings, &bbox).await
}

/// Zoning district polygons.
pub async fn zoning(State(state): State<AppState>, bbox: BoundingBox) -> QueryOutcome {
    state.service.query(Layer::Zoning, &bbox).await
}

/// Administrative parcel polygons.
pub async fn parcels(State(state): State<AppState>, bbox: BoundingBox) -> QueryOutcome {
    state.service.query(Layer::Parcels, &bbox).await
}
