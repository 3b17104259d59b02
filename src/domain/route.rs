//! Validated route polylines
//!
//! `RoutePath` is the only way route geometry enters the simulation: its
//! constructors enforce that at least 2 finite waypoints exist, so every
//! consumer downstream can walk segments without re-checking.

use tracing::warn;

use crate::domain::geo::LngLat;

/// Errors from route path validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteError {
    /// Fewer than 2 usable waypoints remained after filtering.
    InsufficientWaypoints { valid: usize, dropped: usize },
    /// A non-finite coordinate at a known position (strict construction only).
    InvalidCoordinate { index: usize },
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteError::InsufficientWaypoints { valid, dropped } => write!(
                f,
                "insufficient waypoints: {} valid after dropping {}, need at least 2",
                valid, dropped
            ),
            RouteError::InvalidCoordinate { index } => {
                write!(f, "non-finite coordinate at index {}", index)
            }
        }
    }
}

impl std::error::Error for RouteError {}

/// An ordered polyline with at least 2 finite waypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath(Vec<LngLat>);

impl RoutePath {
    /// Strict construction: the first non-finite waypoint fails the whole
    /// path with `InvalidCoordinate`.
    pub fn new(points: Vec<LngLat>) -> Result<Self, RouteError> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(RouteError::InvalidCoordinate { index });
        }
        if points.len() < 2 {
            return Err(RouteError::InsufficientWaypoints {
                valid: points.len(),
                dropped: 0,
            });
        }
        Ok(Self(points))
    }

    /// Lenient construction for ingested data: non-finite waypoints are
    /// dropped (with a warning), and the error escalates to
    /// `InsufficientWaypoints` only if fewer than 2 survive.
    ///
    /// Order of the surviving waypoints is preserved; nothing is
    /// deduplicated or reordered.
    pub fn from_coordinates(points: Vec<LngLat>) -> Result<Self, RouteError> {
        let before = points.len();
        let valid: Vec<LngLat> = points.into_iter().filter(LngLat::is_finite).collect();
        let dropped = before - valid.len();
        if dropped > 0 {
            warn!(dropped, kept = valid.len(), "route_waypoints_dropped");
        }
        if valid.len() < 2 {
            return Err(RouteError::InsufficientWaypoints {
                valid: valid.len(),
                dropped,
            });
        }
        Ok(Self(valid))
    }

    pub fn points(&self) -> &[LngLat] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> LngLat {
        self.0[0]
    }

    pub fn last(&self) -> LngLat {
        self.0[self.0.len() - 1]
    }

    /// Total polyline length as the sum of per-segment great-circle
    /// distances, unrounded.
    pub fn length_km(&self) -> f64 {
        self.0
            .windows(2)
            .map(|pair| pair[0].haversine_km(pair[1]))
            .sum()
    }
}
