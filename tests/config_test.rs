//! Integration tests for configuration loading

use bussim_poc::infra::Config;
use bussim_poc::services::SubdivisionPolicy;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[sim]
id = "bussim-test"
tick_interval_ms = 250
policy = "fixed"
fixed_subdivisions = 8
channel_capacity = 4

[fare]
base_fare = 13.0
per_km_rate = 1.8

[fare.discounts]
regular = 0.0
student = 0.20
senior = 0.20

[[routes]]
name = "04L Lahug - Carbon"
geojson = "routes/04l.geojson"

[[routes]]
name = "01K Urgello - Parkmall"
geojson = "routes/01k.geojson"
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.sim_id(), "bussim-test");
    assert_eq!(config.tick_interval(), Duration::from_millis(250));
    assert_eq!(config.subdivision_policy(), SubdivisionPolicy::FixedCount(8));
    assert_eq!(config.channel_capacity(), 4);
    assert_eq!(config.fare_schedule().base_fare, 13.0);
    assert_eq!(config.fare_schedule().per_km_rate, 1.8);
    assert_eq!(config.fare_schedule().discount_for("student"), 0.20);
    assert_eq!(config.routes().len(), 2);
    assert_eq!(config.routes()[0].name, "04L Lahug - Carbon");
    assert_eq!(config.routes()[1].geojson, "routes/01k.geojson");
}

#[test]
fn test_partial_file_fills_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();

    // Only the tick interval is pinned; everything else comes from defaults.
    let config_content = r#"
[sim]
tick_interval_ms = 50
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.sim_id(), "bussim");
    assert_eq!(config.tick_interval(), Duration::from_millis(50));
    assert_eq!(
        config.subdivision_policy(),
        SubdivisionPolicy::DistanceProportional
    );
    assert_eq!(config.fare_schedule().base_fare, 15.0);
    assert!(config.routes().is_empty());
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[sim\nid = ").unwrap();
    temp_file.flush().unwrap();

    let err = Config::from_file(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_load_with_malformed_file_falls_back() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[sim\nid = ").unwrap();
    temp_file.flush().unwrap();

    // load() never fails startup; a file that cannot be parsed is treated
    // the same as a missing one.
    let config = Config::load(temp_file.path());
    assert_eq!(config.sim_id(), "bussim");
    assert_eq!(config.tick_interval(), Duration::from_millis(1000));
    assert_eq!(config.config_file(), "default");
}

#[test]
fn test_load_fallback() {
    let config = Config::load("/nonexistent/config.toml");
    assert_eq!(config.sim_id(), "bussim");
    assert_eq!(config.tick_interval(), Duration::from_millis(1000));
    assert_eq!(config.fare_schedule().discount_for("senior"), 0.20);
}
