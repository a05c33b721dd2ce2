//! HTTP request handlers for the web server.

mod health;
mod layers;
mod params;

// Re-export handlers for use by the router
pub use health::health;
pub use layers::{buildings, parcels, zoning};
