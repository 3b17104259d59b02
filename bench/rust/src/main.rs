//! Tick cadence benchmark - measures interval drift under feed load
//!
//! The position feeds assume `tokio::time::interval` holds the configured
//! cadence. This measures how far each tick lands from its ideal deadline
//! with many feeds running concurrently, per-tick work included.

use clap::Parser;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "cadence-bench")]
struct Args {
    /// Emission interval in milliseconds (production default is 1000)
    #[arg(long, default_value = "100")]
    interval_ms: u64,
    /// Ticks to measure per feed
    #[arg(short, long, default_value = "50")]
    ticks: u32,
    /// Concurrent simulated feeds
    #[arg(short, long, default_value = "8")]
    feeds: u32,
    /// Densified points per simulated route
    #[arg(long, default_value = "40")]
    points: usize,
}

// Mirrors the per-tick work of the production feed loop: walk one step of a
// densified path and serialize-sized copying of the update payload.
fn make_path(points: usize) -> Vec<(f64, f64)> {
    let a = (123.90, 10.30);
    let b = (123.95, 10.35);
    (0..points)
        .map(|i| {
            let t = i as f64 / points as f64;
            (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
        })
        .collect()
}

async fn run_feed(
    feed: u32,
    interval: Duration,
    ticks: u32,
    path: Vec<(f64, f64)>,
    results_tx: mpsc::UnboundedSender<u64>,
) {
    let mut ticker = tokio::time::interval(interval);
    // First tick is immediate; anchor the ideal schedule on it.
    ticker.tick().await;
    let start = Instant::now();

    let mut index = 0usize;
    for i in 1..=ticks {
        ticker.tick().await;
        let ideal = interval * i;
        let actual = start.elapsed();
        let drift_us = actual.abs_diff(ideal).as_micros() as u64;

        // Per-tick payload work
        let (lng, lat) = path[index % path.len()];
        let payload = format!(
            "{{\"feed\":{},\"index\":{},\"position\":[{:.6},{:.6}]}}",
            feed, index, lng, lat
        );
        std::hint::black_box(payload);
        index += 1;

        let _ = results_tx.send(drift_us);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Tick Cadence Benchmark (Rust)");
    println!("=============================");
    println!("Interval: {} ms", args.interval_ms);
    println!("Ticks per feed: {}", args.ticks);
    println!("Concurrent feeds: {}", args.feeds);
    println!();

    let interval = Duration::from_millis(args.interval_ms);
    let (results_tx, mut results_rx) = mpsc::unbounded_channel();

    let mut handles = vec![];
    for feed in 0..args.feeds {
        let path = make_path(args.points);
        let tx = results_tx.clone();
        handles.push(tokio::spawn(run_feed(feed, interval, args.ticks, path, tx)));
    }
    drop(results_tx);

    let expected = (args.feeds * args.ticks) as usize;
    let mut results: Vec<u64> = Vec::with_capacity(expected);
    while let Some(drift_us) = results_rx.recv().await {
        results.push(drift_us);
        if results.len() % (expected / 10).max(1) == 0 {
            println!("  {}/{} ticks measured", results.len(), expected);
        }
    }

    for h in handles {
        h.await?;
    }

    // Stats
    println!("\n=============================");
    println!("Results (drift from ideal deadline):");
    if !results.is_empty() {
        let sum: u64 = results.iter().sum();
        let avg = sum / results.len() as u64;
        let mut sorted = results.clone();
        sorted.sort();
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let p50 = sorted[sorted.len() / 2];
        let p95 = sorted[(sorted.len() as f64 * 0.95) as usize].min(max);
        let p99 = sorted[(sorted.len() as f64 * 0.99) as usize].min(max);

        println!("  Ticks: {}", results.len());
        println!("  Min: {} us", min);
        println!("  Max: {} us", max);
        println!("  Avg: {} us", avg);
        println!("  P50: {} us", p50);
        println!("  P95: {} us", p95);
        println!("  P99: {} us", p99);
    } else {
        println!("  No ticks measured!");
    }

    Ok(())
}
