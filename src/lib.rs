//! zoning-api - read-only GeoJSON API over municipal zoning data.
//!
//! Serves building footprints, zoning districts, and administrative
//! parcels from a PostGIS database as GeoJSON FeatureCollections,
//! filtered by a caller-supplied bounding box.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod server;
pub mod service;
