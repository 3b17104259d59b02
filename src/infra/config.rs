//! Configuration loading from TOML files
//!
//! Config file is selected via --config <path> (default: config/dev.toml).
//! `Config::from_file` surfaces read and parse failures as hard errors.
//! `Config::load`, the binary entry point, never fails startup: any failure,
//! malformed files included, falls back to compiled defaults with a warning.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::domain::fare::FareSchedule;
use crate::services::feed::FeedConfig;
use crate::services::interpolator::SubdivisionPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Instance tag carried in logs (e.g., "bussim-dev", "bussim-demo")
    #[serde(default = "default_sim_id")]
    pub id: String,
    /// Milliseconds between consecutive position emissions
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Subdivision policy: "distance" or "fixed"
    #[serde(default = "default_policy")]
    pub policy: String,
    /// Steps per segment when policy = "fixed"
    #[serde(default = "default_fixed_subdivisions")]
    pub fixed_subdivisions: u32,
    /// Per-feed update channel bound
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_sim_id() -> String {
    "bussim".to_string()
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_policy() -> String {
    "distance".to_string()
}

fn default_fixed_subdivisions() -> u32 {
    5
}

fn default_channel_capacity() -> usize {
    32
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            id: default_sim_id(),
            tick_interval_ms: default_tick_interval_ms(),
            policy: default_policy(),
            fixed_subdivisions: default_fixed_subdivisions(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FareConfig {
    #[serde(default = "default_base_fare")]
    pub base_fare: f64,
    #[serde(default = "default_per_km_rate")]
    pub per_km_rate: f64,
    /// Discount fraction per passenger type (e.g., student = 0.20)
    #[serde(default = "default_discounts")]
    pub discounts: HashMap<String, f64>,
}

fn default_base_fare() -> f64 {
    15.0
}

fn default_per_km_rate() -> f64 {
    2.5
}

fn default_discounts() -> HashMap<String, f64> {
    let mut discounts = HashMap::new();
    discounts.insert("regular".to_string(), 0.0);
    discounts.insert("student".to_string(), 0.20);
    discounts.insert("senior".to_string(), 0.20);
    discounts.insert("pwd".to_string(), 0.20);
    discounts
}

impl Default for FareConfig {
    fn default() -> Self {
        Self {
            base_fare: default_base_fare(),
            per_km_rate: default_per_km_rate(),
            discounts: default_discounts(),
        }
    }
}

/// One simulated route: display name plus the GeoJSON file holding its
/// polyline.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntry {
    pub name: String,
    pub geojson: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub fare: FareConfig,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    sim_id: String,
    tick_interval_ms: u64,
    policy: SubdivisionPolicy,
    channel_capacity: usize,
    fare: FareSchedule,
    routes: Vec<RouteEntry>,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sim_id: default_sim_id(),
            tick_interval_ms: default_tick_interval_ms(),
            policy: SubdivisionPolicy::DistanceProportional,
            channel_capacity: default_channel_capacity(),
            fare: build_schedule(&FareConfig::default()),
            routes: Vec::new(),
            config_file: "default".to_string(),
        }
    }
}

/// Resolve the policy string; unknown values fall back to
/// distance-proportional with a warning rather than failing startup.
fn parse_policy(raw: &str, fixed_subdivisions: u32) -> SubdivisionPolicy {
    match raw {
        "distance" => SubdivisionPolicy::DistanceProportional,
        "fixed" => SubdivisionPolicy::FixedCount(fixed_subdivisions),
        other => {
            warn!(policy = %other, "unknown_subdivision_policy_using_distance");
            SubdivisionPolicy::DistanceProportional
        }
    }
}

fn build_schedule(fare: &FareConfig) -> FareSchedule {
    let mut schedule = FareSchedule::new(fare.base_fare, fare.per_km_rate);
    for (passenger_type, fraction) in &fare.discounts {
        schedule = schedule.with_discount(passenger_type, *fraction);
    }
    schedule
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self {
            policy: parse_policy(&toml_config.sim.policy, toml_config.sim.fixed_subdivisions),
            sim_id: toml_config.sim.id,
            tick_interval_ms: toml_config.sim.tick_interval_ms,
            channel_capacity: toml_config.sim.channel_capacity,
            fare: build_schedule(&toml_config.fare),
            routes: toml_config.routes,
            config_file: path.display().to_string(),
        })
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {:#}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Assemble the per-feed settings for one named route.
    pub fn feed_config(&self, route: &str) -> FeedConfig {
        FeedConfig {
            interval: self.tick_interval(),
            policy: self.policy,
            route: route.to_string(),
            channel_capacity: self.channel_capacity,
        }
    }

    // Getters for all config fields
    pub fn sim_id(&self) -> &str {
        &self.sim_id
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn subdivision_policy(&self) -> SubdivisionPolicy {
        self.policy
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    pub fn fare_schedule(&self) -> &FareSchedule {
        &self.fare
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to set the tick interval
    #[cfg(test)]
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = ms;
        self
    }
}
