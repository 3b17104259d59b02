//! Path densification
//!
//! Turns a sparse route polyline into the fine-grained step sequence the
//! position feed walks. Pure math: no clock, no I/O, no randomness, so the
//! same path and policy always produce the same sequence.

use crate::domain::geo::LngLat;
use crate::domain::route::RoutePath;

const DISTANCE_SCALE: f64 = 100.0;
const MIN_SUBDIVISIONS: i64 = 3;
const MAX_SUBDIVISIONS: i64 = 40;

/// How many interpolated steps each segment receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubdivisionPolicy {
    /// Scale with segment length in degree space:
    /// `clamp(round(planar_degrees * 100), 3, 40)`. Long hops get smoother
    /// animation, short hops stay cheap.
    DistanceProportional,
    /// Constant step count per segment regardless of length. Values below
    /// 1 are treated as 1.
    FixedCount(u32),
}

impl Default for SubdivisionPolicy {
    fn default() -> Self {
        SubdivisionPolicy::DistanceProportional
    }
}

impl SubdivisionPolicy {
    /// Step count for one segment.
    pub fn subdivisions(&self, a: LngLat, b: LngLat) -> u32 {
        match self {
            SubdivisionPolicy::DistanceProportional => {
                let scaled = (a.planar_degrees(b) * DISTANCE_SCALE).round() as i64;
                scaled.clamp(MIN_SUBDIVISIONS, MAX_SUBDIVISIONS) as u32
            }
            SubdivisionPolicy::FixedCount(n) => (*n).max(1),
        }
    }
}

/// Densify a route into interpolated steps.
///
/// Each consecutive waypoint pair `(a, b)` contributes points
/// `a.lerp(b, i / n)` for `i` in `0..n`; the segment endpoint itself is
/// omitted because it opens the next segment. The path's final waypoint is
/// appended once at the end, so the output always starts at the first
/// waypoint, ends at the last, and never duplicates a joint.
pub fn densify(path: &RoutePath, policy: SubdivisionPolicy) -> Vec<LngLat> {
    let points = path.points();
    let mut out = Vec::new();

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let n = policy.subdivisions(a, b);
        for i in 0..n {
            out.push(a.lerp(b, f64::from(i) / f64::from(n)));
        }
    }
    out.push(path.last());

    out
}
