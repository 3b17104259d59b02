//! GeoJSON route ingestion
//!
//! Reads a route corridor from a `.geojson` file. The first `LineString`
//! found wins: a bare geometry, a single feature, or the first suitable
//! feature of a collection. `MultiLineString` contributes its first part.

use std::path::Path;

use anyhow::{bail, Context, Result};
use geojson::{Feature, GeoJson, Geometry, Value};
use tracing::warn;

use crate::domain::LngLat;

/// Load route waypoints (`[lng, lat]` position order) from a GeoJSON file.
///
/// Positions shorter than two numbers are skipped with a warning. No
/// finiteness vetting happens here; `RoutePath` owns that.
pub fn load_route(path: &Path) -> Result<Vec<LngLat>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read route file {}", path.display()))?;
    let gj: GeoJson = contents
        .parse()
        .with_context(|| format!("Failed to parse GeoJSON in {}", path.display()))?;

    let line = match gj {
        GeoJson::Geometry(geometry) => line_string(geometry),
        GeoJson::Feature(feature) => feature_line(feature),
        GeoJson::FeatureCollection(collection) => {
            collection.features.into_iter().find_map(feature_line)
        }
    };

    match line {
        Some(raw) => Ok(positions_to_points(path, raw)),
        None => bail!("No LineString geometry in {}", path.display()),
    }
}

fn feature_line(feature: Feature) -> Option<Vec<Vec<f64>>> {
    feature.geometry.and_then(line_string)
}

fn line_string(geometry: Geometry) -> Option<Vec<Vec<f64>>> {
    match geometry.value {
        Value::LineString(line) => Some(line),
        Value::MultiLineString(mut lines) if !lines.is_empty() => Some(lines.remove(0)),
        _ => None,
    }
}

fn positions_to_points(path: &Path, raw: Vec<Vec<f64>>) -> Vec<LngLat> {
    let mut points = Vec::with_capacity(raw.len());
    let mut short = 0usize;
    for position in raw {
        // Positions may carry altitude; only lng and lat matter.
        if position.len() >= 2 {
            points.push(LngLat::new(position[0], position[1]));
        } else {
            short += 1;
        }
    }
    if short > 0 {
        warn!(
            file = %path.display(),
            skipped = short,
            "geojson_short_positions_skipped"
        );
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_geojson(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_bare_line_string() {
        let file = write_geojson(
            r#"{"type": "LineString", "coordinates": [[123.9, 10.3], [123.91, 10.31]]}"#,
        );

        let points = load_route(file.path()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], LngLat::new(123.9, 10.3));
        assert_eq!(points[1], LngLat::new(123.91, 10.31));
    }

    #[test]
    fn test_load_feature() {
        let file = write_geojson(
            r#"{
                "type": "Feature",
                "properties": {"name": "jones-loop"},
                "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}
            }"#,
        );

        let points = load_route(file.path()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], LngLat::new(1.0, 1.0));
    }

    #[test]
    fn test_collection_picks_first_line_string() {
        // A stop marker (Point) precedes the corridor; it must be skipped.
        let file = write_geojson(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {},
                        "geometry": {"type": "Point", "coordinates": [123.9, 10.3]}
                    },
                    {
                        "type": "Feature",
                        "properties": {},
                        "geometry": {"type": "LineString", "coordinates": [[123.9, 10.3], [123.95, 10.32], [124.0, 10.35]]}
                    }
                ]
            }"#,
        );

        let points = load_route(file.path()).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], LngLat::new(123.9, 10.3));
    }

    #[test]
    fn test_multi_line_string_first_part() {
        let file = write_geojson(
            r#"{
                "type": "MultiLineString",
                "coordinates": [
                    [[0.0, 0.0], [0.5, 0.5]],
                    [[9.0, 9.0], [9.5, 9.5]]
                ]
            }"#,
        );

        let points = load_route(file.path()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], LngLat::new(0.5, 0.5));
    }

    #[test]
    fn test_no_line_string_is_an_error() {
        let file = write_geojson(r#"{"type": "Point", "coordinates": [123.9, 10.3]}"#);

        let err = load_route(file.path()).unwrap_err();
        assert!(err.to_string().contains("No LineString"));
    }

    #[test]
    fn test_short_positions_skipped() {
        let file = write_geojson(
            r#"{"type": "LineString", "coordinates": [[123.9, 10.3], [1.0], [123.91, 10.31]]}"#,
        );

        let points = load_route(file.path()).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_altitude_ignored() {
        let file = write_geojson(
            r#"{"type": "LineString", "coordinates": [[123.9, 10.3, 12.0], [123.91, 10.31, 13.5]]}"#,
        );

        let points = load_route(file.path()).unwrap();
        assert_eq!(points[0], LngLat::new(123.9, 10.3));
    }

    #[test]
    fn test_missing_file() {
        let err = load_route(Path::new("/nonexistent/route.geojson")).unwrap_err();
        assert!(err.to_string().contains("Failed to read route file"));
    }
}
