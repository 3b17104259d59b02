//! Domain models - route geometry and fares
//!
//! This module contains the canonical data types used throughout the system:
//! - `LngLat` - a waypoint in GeoJSON position order (longitude first)
//! - `RoutePath` - a validated route polyline (at least 2 finite waypoints)
//! - `RouteError` - the path validation error taxonomy
//! - `FareSchedule` / `FareQuote` - distance-based fare computation

pub mod fare;
pub mod geo;
pub mod route;

// Re-export commonly used types
pub use fare::{FareQuote, FareSchedule};
pub use geo::LngLat;
pub use route::{RouteError, RoutePath};
