//! Lock-free metrics collection and periodic reporting
//!
//! Counters use atomics so feed workers never contend on a lock; the
//! reporter is the only place that resets anything (via atomic swap).
//!
//! NOTE: All atomics use Relaxed ordering intentionally. These are
//! statistical counters only; nothing synchronizes through them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::info;

/// Lock-free metrics collector for the simulation daemon.
#[derive(Debug)]
pub struct Metrics {
    /// Feeds ever started (monotonic)
    feeds_started: AtomicU64,
    /// Feeds that have wound down (monotonic)
    feeds_stopped: AtomicU64,
    /// Total position updates emitted (monotonic)
    steps_total: AtomicU64,
    /// Updates since last report (reset on report)
    steps_since_report: AtomicU64,
    /// Completed route loops (monotonic)
    laps_total: AtomicU64,
    /// Waypoints discarded during route ingestion (monotonic)
    waypoints_dropped: AtomicU64,
    /// Last report time (only touched by the reporter)
    last_report_time: Mutex<Instant>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            feeds_started: AtomicU64::new(0),
            feeds_stopped: AtomicU64::new(0),
            steps_total: AtomicU64::new(0),
            steps_since_report: AtomicU64::new(0),
            laps_total: AtomicU64::new(0),
            waypoints_dropped: AtomicU64::new(0),
            last_report_time: Mutex::new(Instant::now()),
        }
    }

    #[inline]
    pub fn record_feed_started(&self) {
        self.feeds_started.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_feed_stopped(&self) {
        self.feeds_stopped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one emitted position update (lock-free)
    #[inline]
    pub fn record_step(&self) {
        self.steps_total.fetch_add(1, Ordering::Relaxed);
        self.steps_since_report.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one completed loop of a route (lock-free)
    #[inline]
    pub fn record_lap(&self) {
        self.laps_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record waypoints discarded during ingestion (lock-free)
    #[inline]
    pub fn record_waypoints_dropped(&self, count: u64) {
        self.waypoints_dropped.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn steps_total(&self) -> u64 {
        self.steps_total.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn laps_total(&self) -> u64 {
        self.laps_total.load(Ordering::Relaxed)
    }

    /// Feeds currently running.
    #[inline]
    pub fn feeds_active(&self) -> u64 {
        let started = self.feeds_started.load(Ordering::Relaxed);
        let stopped = self.feeds_stopped.load(Ordering::Relaxed);
        started.saturating_sub(stopped)
    }

    /// Calculate and return a metrics summary, then reset periodic counters
    ///
    /// This is the only method that resets anything. The swap keeps the
    /// snapshot consistent while workers keep counting.
    pub fn report(&self) -> MetricsSummary {
        let steps_count = self.steps_since_report.swap(0, Ordering::Relaxed);

        let elapsed = {
            let mut last = self.last_report_time.lock().unwrap_or_else(|e| e.into_inner());
            let elapsed = last.elapsed();
            *last = Instant::now();
            elapsed
        };

        let steps_per_sec = if elapsed.as_secs_f64() > 0.0 {
            steps_count as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        MetricsSummary {
            feeds_active: self.feeds_active(),
            feeds_started: self.feeds_started.load(Ordering::Relaxed),
            steps_total: self.steps_total.load(Ordering::Relaxed),
            steps_per_sec,
            laps_total: self.laps_total.load(Ordering::Relaxed),
            waypoints_dropped: self.waypoints_dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct MetricsSummary {
    pub feeds_active: u64,
    pub feeds_started: u64,
    pub steps_total: u64,
    /// Emission rate since the previous report
    pub steps_per_sec: f64,
    pub laps_total: u64,
    pub waypoints_dropped: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            feeds_active = %self.feeds_active,
            feeds_started = %self.feeds_started,
            steps_total = %self.steps_total,
            steps_per_sec = format!("{:.1}", self.steps_per_sec),
            laps_total = %self.laps_total,
            waypoints_dropped = %self.waypoints_dropped,
            "metrics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.steps_total(), 0);
        assert_eq!(metrics.laps_total(), 0);
        assert_eq!(metrics.feeds_active(), 0);
    }

    #[test]
    fn test_record_step() {
        let metrics = Metrics::new();

        metrics.record_step();
        metrics.record_step();
        assert_eq!(metrics.steps_total(), 2);
    }

    #[test]
    fn test_feeds_active_tracks_started_minus_stopped() {
        let metrics = Metrics::new();

        metrics.record_feed_started();
        metrics.record_feed_started();
        assert_eq!(metrics.feeds_active(), 2);

        metrics.record_feed_stopped();
        assert_eq!(metrics.feeds_active(), 1);
    }

    #[test]
    fn test_report_resets_periodic_counters() {
        let metrics = Metrics::new();

        metrics.record_step();
        metrics.record_step();
        metrics.record_step();
        metrics.record_lap();

        let summary = metrics.report();
        assert_eq!(summary.steps_total, 3);
        assert_eq!(summary.laps_total, 1);

        // The rate window resets, the monotonic totals do not.
        assert_eq!(metrics.steps_since_report.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.steps_total(), 3);
    }

    #[test]
    fn test_report_empty() {
        let metrics = Metrics::new();
        let summary = metrics.report();

        assert_eq!(summary.steps_total, 0);
        assert_eq!(summary.steps_per_sec, 0.0);
        assert_eq!(summary.waypoints_dropped, 0);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::sync::Arc;
        use std::thread;

        let metrics = Arc::new(Metrics::new());
        let mut handles = vec![];

        // Spawn 10 threads, each recording 1000 steps
        for _ in 0..10 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    m.record_step();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(metrics.steps_total(), 10_000);
    }
}
