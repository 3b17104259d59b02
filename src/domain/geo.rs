//! Coordinate primitives for route geometry
//!
//! All coordinates are longitude-first (`[lng, lat]`, GeoJSON position
//! order). That contract holds everywhere past the ingestion boundary;
//! loaders convert raw positions into `LngLat` and nothing downstream
//! reorders axes.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A single waypoint: longitude and latitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Whether both axes are finite numbers (rejects NaN and infinities).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// Per-axis linear interpolation toward `other`.
    ///
    /// `t = 0` returns `self` exactly, `t = 1` returns `other` exactly.
    pub fn lerp(&self, other: LngLat, t: f64) -> LngLat {
        LngLat {
            lng: self.lng + (other.lng - self.lng) * t,
            lat: self.lat + (other.lat - self.lat) * t,
        }
    }

    /// Euclidean distance in raw degree space, no projection.
    ///
    /// Only meaningful as a relative measure (subdivision scaling); fares
    /// always go through [`LngLat::haversine_km`].
    pub fn planar_degrees(&self, other: LngLat) -> f64 {
        let dlng = other.lng - self.lng;
        let dlat = other.lat - self.lat;
        (dlng * dlng + dlat * dlat).sqrt()
    }

    /// Great-circle distance in kilometers (Haversine, unrounded).
    pub fn haversine_km(&self, other: LngLat) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

impl std::fmt::Display for LngLat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lng, self.lat)
    }
}

/// Round half away from zero to 2 decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
