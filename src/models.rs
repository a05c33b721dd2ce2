//! Domain types shared by the store, service, and HTTP layers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// SRID the source geometries are stored in (NAD83(HARN) / Washington North, ftUS).
pub const LOCAL_SRID: i32 = 2926;

/// SRID of every geometry returned to callers (WGS 84 longitude/latitude).
pub const GEOGRAPHIC_SRID: i32 = 4326;

/// Zoning code reported for buildings whose centroid falls in no district.
pub const UNZONED: &str = "Unzoned";

/// Errors raised while validating a bounding box.
#[derive(Debug, Error, PartialEq)]
pub enum BboxError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Axis-aligned geographic rectangle, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Build a box, rejecting NaN and infinite coordinates.
    ///
    /// Ranges and corner ordering are not checked here; the database
    /// decides what a degenerate or inverted envelope matches.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, BboxError> {
        for (field, value) in [
            ("min_lon", min_lon),
            ("min_lat", min_lat),
            ("max_lon", max_lon),
            ("max_lat", max_lat),
        ] {
            if !value.is_finite() {
                return Err(BboxError::NonFinite { field, value });
            }
        }

        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }
}

/// One of the three queryable map layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Buildings,
    Zoning,
    Parcels,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Buildings, Layer::Zoning, Layer::Parcels];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Buildings => "buildings",
            Layer::Zoning => "zoning",
            Layer::Parcels => "parcels",
        }
    }

    /// Maximum number of features a single response may carry.
    pub fn max_features(&self) -> usize {
        match self {
            Layer::Buildings => 1000,
            Layer::Zoning | Layer::Parcels => 100,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a building's recorded land use agrees with its zoning rule.
///
/// A building with no applicable rule counts as compliant. That default is a
/// zoning policy call rather than something the data implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    Compliant,
    Conflict,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "Compliant",
            ComplianceStatus::Conflict => "Conflict",
        }
    }
}

/// GeoJSON FeatureCollection as produced by the service layer itself.
///
/// Collections coming back from the database are forwarded as raw JSON;
/// this type only covers the empty and degraded bodies built locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features: Vec::new(),
            error: None,
        }
    }

    /// Empty collection carrying a diagnostic for the caller.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty()
        }
    }
}
