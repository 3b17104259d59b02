//! Bus simulation PoC - timed position feeds over commuter routes
//!
//! Replays configured route corridors as interpolated position feeds at a
//! fixed cadence and meters a fare for every completed loop.
//!
//! Module structure:
//! - `domain/` - Core business types (LngLat, RoutePath, FareSchedule)
//! - `io/` - External interfaces (GeoJSON route ingestion)
//! - `services/` - Business logic (Interpolator, PositionFeed, FareMeter)
//! - `infra/` - Infrastructure (Config, Metrics)

use clap::Parser;
use bussim_poc::infra::{Config, Metrics};

/// Bus simulation PoC - timed position feeds over commuter routes
#[derive(Parser, Debug)]
#[command(name = "bussim-poc", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}
use bussim_poc::domain::{FareQuote, RoutePath};
use bussim_poc::services::{FareMeter, PositionFeed};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Default: INFO, use RUST_LOG=debug for per-update visibility
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!("bussim-poc starting");

    // Parse command line arguments using clap
    let args = Args::parse();

    // Load configuration from TOML file
    let config = Config::load(&args.config);

    info!(
        config_file = %config.config_file(),
        sim_id = %config.sim_id(),
        tick_interval_ms = %config.tick_interval().as_millis(),
        policy = ?config.subdivision_policy(),
        channel_capacity = %config.channel_capacity(),
        routes = %config.routes().len(),
        "config_loaded"
    );

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let metrics = Arc::new(Metrics::new());

    // Start one feed per configured route. A bad route file skips that
    // route; the rest keep running.
    let mut handles = Vec::new();
    for entry in config.routes() {
        let raw = match bussim_poc::io::load_route(Path::new(&entry.geojson)) {
            Ok(raw) => raw,
            Err(e) => {
                error!(route = %entry.name, error = %e, "route_load_failed");
                continue;
            }
        };
        let raw_len = raw.len();

        let route = match RoutePath::from_coordinates(raw) {
            Ok(route) => route,
            Err(e) => {
                error!(route = %entry.name, error = %e, "route_rejected");
                continue;
            }
        };
        metrics.record_waypoints_dropped((raw_len - route.len()) as u64);

        let feed = PositionFeed::from_route(&route, config.feed_config(&entry.name))
            .with_metrics(metrics.clone());
        info!(
            route = %entry.name,
            waypoints = %route.len(),
            steps = %feed.steps(),
            "feed_configured"
        );

        let (handle, mut update_rx) = feed.start();

        // Consumer: log updates and meter one regular passenger per loop.
        let mut meter = FareMeter::new(config.fare_schedule().clone(), "regular", 1);
        let route_name = entry.name.clone();
        tokio::spawn(async move {
            let mut last_lap = 0u64;
            let mut last_quote: Option<FareQuote> = None;
            while let Some(update) = update_rx.recv().await {
                if update.lap > last_lap {
                    // First update of a new lap; the held quote covers the
                    // full previous loop.
                    if let Some(quote) = last_quote.take() {
                        info!(
                            route = %route_name,
                            lap = %last_lap,
                            distance_km = %quote.distance_km,
                            fare = %quote.total_rounded(),
                            "route_lap_fare"
                        );
                    }
                    last_lap = update.lap;
                }
                debug!(
                    route = %update.route,
                    index = %update.index,
                    lap = %update.lap,
                    position = %update.position,
                    "position"
                );
                last_quote = Some(meter.observe(&update));
            }
        });

        handles.push(handle);
    }

    if handles.is_empty() {
        warn!("no_routes_running");
    }

    // Start metrics reporter
    let metrics_clone = metrics.clone();
    let mut reporter_shutdown = shutdown_rx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tokio::select! {
                res = reporter_shutdown.changed() => {
                    if res.is_err() || *reporter_shutdown.borrow() {
                        return;
                    }
                }
                _ = interval.tick() => {
                    metrics_clone.report().log();
                }
            }
        }
    });

    // Handle shutdown on Ctrl+C
    let shutdown_signal = shutdown_tx;
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_signal.send(true);
    });

    // Block until the shutdown signal flips
    let mut shutdown_wait = shutdown_rx;
    while !*shutdown_wait.borrow() {
        if shutdown_wait.changed().await.is_err() {
            break;
        }
    }

    // Wind down every feed before exiting
    for handle in handles {
        handle.stop().await;
    }

    metrics.report().log();
    info!("bussim-poc shutdown complete");
    Ok(())
}
