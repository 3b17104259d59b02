//! Fare Quote Tool
//!
//! One-shot fare quote between two coordinates, using the schedule from the
//! config file (or the compiled defaults when the file is absent).
//!
//! Usage:
//!   fareq --from 123.9,10.3 --to 123.91,10.31
//!   fareq --from 123.9,10.3 --to 123.91,10.31 --passenger-type student --passengers 2

use bussim_poc::domain::LngLat;
use bussim_poc::infra::Config;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "fareq", about = "One-shot fare quote between two coordinates")]
struct Args {
    /// Origin as lng,lat (e.g. 123.9,10.3)
    #[arg(long, value_parser = parse_lnglat)]
    from: LngLat,

    /// Destination as lng,lat (e.g. 123.91,10.31)
    #[arg(long, value_parser = parse_lnglat)]
    to: LngLat,

    /// Passenger type for the discount lookup (unknown types pay full fare)
    #[arg(long, default_value = "regular")]
    passenger_type: String,

    #[arg(long, default_value = "1")]
    passengers: u32,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

fn parse_lnglat(s: &str) -> Result<LngLat, String> {
    let (lng, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected lng,lat, got '{s}'"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("bad longitude '{lng}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("bad latitude '{lat}'"))?;

    let point = LngLat::new(lng, lat);
    if !point.is_finite() {
        return Err("coordinates must be finite".to_string());
    }
    Ok(point)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = Config::load(&args.config);
    let quote = config.fare_schedule().quote_between(
        args.from,
        args.to,
        &args.passenger_type,
        args.passengers,
    );

    println!("{}", serde_json::to_string_pretty(&quote)?);
    Ok(())
}
