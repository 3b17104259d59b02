//! Position feed - timer-driven walk of a densified route
//!
//! Each feed owns one interval timer and one bounded update channel. The
//! walk emits the current step immediately on start, then advances one step
//! per tick, wrapping to the start of the sequence forever. A slow
//! subscriber backs the walk up rather than losing steps; once it drains,
//! the cadence resumes at the configured interval. Cancellation is
//! cooperative via a watch signal: `FeedHandle::stop()` flips it and awaits
//! the worker, so when `stop()` returns the timer is released and nothing
//! further will be delivered. Dropping the receiver ends the feed the same
//! way from the subscriber side.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::domain::geo::LngLat;
use crate::domain::route::{RouteError, RoutePath};
use crate::infra::metrics::Metrics;
use crate::services::interpolator::{densify, SubdivisionPolicy};

/// Generate a new feed ID (UUIDv7, time-sortable)
pub fn new_feed_id() -> String {
    Uuid::now_v7().to_string()
}

/// Get current epoch milliseconds
#[inline]
pub fn epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Cadence and shape of one feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Time between consecutive emissions; a zero value is clamped to 1ms.
    pub interval: Duration,
    /// How densely segments are subdivided before the walk starts.
    pub policy: SubdivisionPolicy,
    /// Route label carried in logs and updates.
    pub route: String,
    /// Bound of the update channel. A slow subscriber delays the walk
    /// rather than losing steps.
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            policy: SubdivisionPolicy::default(),
            route: "unnamed".to_string(),
            channel_capacity: 32,
        }
    }
}

/// One emitted simulation step.
#[derive(Debug, Clone, Serialize)]
pub struct PositionUpdate {
    pub feed_id: String,
    pub route: String,
    /// 0-based step within the current lap; resets to 0 on wrap.
    pub index: usize,
    /// Completed loops of the route (0 during the first pass).
    pub lap: u64,
    pub position: LngLat,
    /// Epoch milliseconds at emission.
    pub ts_ms: u64,
}

/// A configured, not-yet-running feed.
#[derive(Debug)]
pub struct PositionFeed {
    points: Vec<LngLat>,
    cfg: FeedConfig,
    metrics: Option<Arc<Metrics>>,
}

impl PositionFeed {
    /// Build a feed from raw ingested coordinates.
    ///
    /// Zero waypoints is the degenerate-success case: the feed starts and
    /// completes immediately with no emissions. Anything else goes through
    /// lenient path validation, so an unusable path surfaces
    /// `InsufficientWaypoints` here, before any task or timer exists.
    pub fn from_coordinates(raw: Vec<LngLat>, cfg: FeedConfig) -> Result<Self, RouteError> {
        if raw.is_empty() {
            return Ok(Self { points: Vec::new(), cfg, metrics: None });
        }
        let path = RoutePath::from_coordinates(raw)?;
        Ok(Self::from_route(&path, cfg))
    }

    /// Build a feed from an already-validated route.
    pub fn from_route(route: &RoutePath, cfg: FeedConfig) -> Self {
        let points = densify(route, cfg.policy);
        Self { points, cfg, metrics: None }
    }

    /// Attach shared counters (steps, laps).
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Number of steps in one lap of the walk.
    pub fn steps(&self) -> usize {
        self.points.len()
    }

    /// Spawn the worker and hand back its control handle plus the update
    /// stream. The first update arrives immediately, each following one a
    /// full interval later.
    pub fn start(self) -> (FeedHandle, mpsc::Receiver<PositionUpdate>) {
        let (update_tx, update_rx) = mpsc::channel(self.cfg.channel_capacity.max(1));
        let (stop_tx, stop_rx) = watch::channel(false);
        let feed_id = new_feed_id();

        if let Some(metrics) = &self.metrics {
            metrics.record_feed_started();
        }

        let worker = FeedWorker {
            feed_id: feed_id.clone(),
            route: self.cfg.route,
            interval: self.cfg.interval,
            points: self.points,
            metrics: self.metrics,
            update_tx,
        };
        let task = tokio::spawn(worker.run(stop_rx));

        (FeedHandle { feed_id, stop_tx, task }, update_rx)
    }
}

/// Control handle for a running feed.
///
/// Dropping the handle without calling [`FeedHandle::stop`] also winds the
/// worker down (the closed stop signal reads as cancellation), so an
/// abandoned feed cannot leak its timer.
pub struct FeedHandle {
    feed_id: String,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    pub fn feed_id(&self) -> &str {
        &self.feed_id
    }

    /// Whether the worker has exited (stopped, unsubscribed, or degenerate
    /// empty path).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the feed and wait for the worker to exit.
    ///
    /// When this returns, the timer is released and no further update will
    /// ever be delivered on this feed's channel.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

struct FeedWorker {
    feed_id: String,
    route: String,
    interval: Duration,
    points: Vec<LngLat>,
    metrics: Option<Arc<Metrics>>,
    update_tx: mpsc::Sender<PositionUpdate>,
}

impl FeedWorker {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            feed_id = %self.feed_id,
            route = %self.route,
            steps = self.points.len(),
            interval_ms = %self.interval.as_millis(),
            "feed_started"
        );

        if self.points.is_empty() {
            info!(feed_id = %self.feed_id, route = %self.route, "feed_empty_path_done");
        } else {
            self.walk(&mut shutdown).await;
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_feed_stopped();
        }
    }

    async fn walk(&self, shutdown: &mut watch::Receiver<bool>) {
        // interval() panics on a zero period.
        let mut ticker = interval(self.interval.max(Duration::from_millis(1)));
        // Ticks missed while parked on a full channel are not replayed in a
        // burst; the walk resumes one step per interval.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut index = 0usize;
        let mut lap = 0u64;

        loop {
            // Check for cancellation; the first tick completes immediately
            // so index 0 goes out at start.
            tokio::select! {
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        info!(feed_id = %self.feed_id, route = %self.route, "feed_stopped");
                        return;
                    }
                }
                _ = ticker.tick() => {}
            }

            let update = PositionUpdate {
                feed_id: self.feed_id.clone(),
                route: self.route.clone(),
                index,
                lap,
                position: self.points[index],
                ts_ms: epoch_ms(),
            };

            // The send blocks when the subscriber lags; cancellation must
            // still get through, hence the second select.
            tokio::select! {
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        info!(feed_id = %self.feed_id, route = %self.route, "feed_stopped");
                        return;
                    }
                }
                sent = self.update_tx.send(update) => {
                    if sent.is_err() {
                        debug!(feed_id = %self.feed_id, route = %self.route, "feed_subscriber_gone");
                        return;
                    }
                }
            }

            trace!(feed_id = %self.feed_id, index, lap, "feed_step");
            if let Some(metrics) = &self.metrics {
                metrics.record_step();
            }

            index += 1;
            if index == self.points.len() {
                index = 0;
                lap += 1;
                debug!(feed_id = %self.feed_id, route = %self.route, lap, "feed_lap_completed");
                if let Some(metrics) = &self.metrics {
                    metrics.record_lap();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lng: f64, lat: f64) -> LngLat {
        LngLat::new(lng, lat)
    }

    #[test]
    fn test_from_coordinates_densifies() {
        let feed = PositionFeed::from_coordinates(
            vec![pt(0.0, 0.0), pt(1.0, 1.0)],
            FeedConfig { policy: SubdivisionPolicy::FixedCount(5), ..FeedConfig::default() },
        )
        .unwrap();
        assert_eq!(feed.steps(), 6);
    }

    #[test]
    fn test_single_waypoint_is_rejected_before_start() {
        let err = PositionFeed::from_coordinates(vec![pt(123.9, 10.3)], FeedConfig::default())
            .unwrap_err();
        assert!(matches!(err, RouteError::InsufficientWaypoints { valid: 1, .. }));
    }

    #[test]
    fn test_empty_path_is_degenerate_success() {
        let feed = PositionFeed::from_coordinates(vec![], FeedConfig::default()).unwrap();
        assert_eq!(feed.steps(), 0);
    }

    #[tokio::test]
    async fn test_empty_path_completes_without_emitting() {
        let feed = PositionFeed::from_coordinates(vec![], FeedConfig::default()).unwrap();
        let (handle, mut rx) = feed.start();

        assert!(rx.recv().await.is_none());
        handle.stop().await;
    }

    #[tokio::test]
    async fn test_feed_ids_are_unique_per_start() {
        let cfg = FeedConfig::default();
        let a = PositionFeed::from_coordinates(vec![], cfg.clone()).unwrap().start();
        let b = PositionFeed::from_coordinates(vec![], cfg).unwrap().start();
        assert_ne!(a.0.feed_id(), b.0.feed_id());
        a.0.stop().await;
        b.0.stop().await;
    }
}
