//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `geojson` - Route corridor ingestion from GeoJSON files

pub mod geojson;

// Re-export commonly used types
pub use geojson::load_route;
