//! District boundary extraction from GeoJSON.
//!
//! GeoJSON stores positions as [lon, lat]; the map renderer wants
//! (lat, lon). This module pulls the exterior ring out of the boundary
//! feature, swaps the axes, and derives the center and bounding box the
//! viewport is initialized from.

use log::warn;
use serde_json::Value;
use thiserror::Error;

/// Fallback map center when the boundary document cannot be loaded.
pub const DEFAULT_CENTER: (f64, f64) = (-12.1410, -77.0225);

/// Fallback zoom level paired with [`DEFAULT_CENTER`].
pub const DEFAULT_ZOOM: u8 = 15;

/// Axis-aligned extent of the boundary ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// District outline in renderer axis order, with derived summary geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBoundary {
    /// Exterior ring as (lat, lon) pairs, source order preserved.
    pub coordinates: Vec<(f64, f64)>,
    /// Unweighted mean of the ring vertices per axis. Not an area-weighted
    /// centroid; this is what the map has always centered on.
    pub center: (f64, f64),
    pub bounds: BoundaryBounds,
}

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("boundary document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("boundary document contains no feature")]
    MissingFeature,
    #[error("feature has no geometry")]
    MissingGeometry,
    #[error("unsupported geometry type `{0}`")]
    UnsupportedGeometry(String),
    #[error("geometry has no usable coordinates")]
    EmptyGeometry,
}

/// Normalize the boundary feature in `document` (a GeoJSON FeatureCollection
/// or a single Feature).
///
/// `Polygon` geometries contribute their exterior ring; holes are ignored.
/// For `MultiPolygon` the polygon with the most exterior vertices wins, the
/// first one on ties. Any other geometry type is rejected outright rather
/// than producing a partial result.
pub fn normalize_boundary(document: &str) -> Result<NormalizedBoundary, BoundaryError> {
    let root: Value = serde_json::from_str(document)?;

    let feature = match root.get("features") {
        Some(Value::Array(features)) => features.first().ok_or(BoundaryError::MissingFeature)?,
        Some(_) => return Err(BoundaryError::MissingFeature),
        None => &root,
    };

    let geometry = feature
        .get("geometry")
        .filter(|g| !g.is_null())
        .ok_or(BoundaryError::MissingGeometry)?;
    let tag = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or(BoundaryError::MissingGeometry)?;
    let coordinates = geometry
        .get("coordinates")
        .ok_or(BoundaryError::EmptyGeometry)?;

    let ring: Vec<Vec<f64>> = match tag {
        "Polygon" => {
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(coordinates.clone())?;
            rings.into_iter().next().ok_or(BoundaryError::EmptyGeometry)?
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Vec<f64>>>> = serde_json::from_value(coordinates.clone())?;
            let largest = polygons
                .into_iter()
                .filter(|polygon| !polygon.is_empty())
                .reduce(|largest, current| {
                    if current[0].len() > largest[0].len() {
                        current
                    } else {
                        largest
                    }
                })
                .ok_or(BoundaryError::EmptyGeometry)?;
            largest.into_iter().next().ok_or(BoundaryError::EmptyGeometry)?
        }
        other => return Err(BoundaryError::UnsupportedGeometry(other.to_string())),
    };

    // [lon, lat] -> (lat, lon); positions may carry altitude, which is dropped
    let mut coordinates = Vec::with_capacity(ring.len());
    for position in &ring {
        if position.len() < 2 {
            return Err(BoundaryError::EmptyGeometry);
        }
        coordinates.push((position[1], position[0]));
    }
    if coordinates.is_empty() {
        return Err(BoundaryError::EmptyGeometry);
    }

    Ok(summarize(coordinates))
}

fn summarize(coordinates: Vec<(f64, f64)>) -> NormalizedBoundary {
    let count = coordinates.len() as f64;
    let (lat_sum, lon_sum) = coordinates
        .iter()
        .fold((0.0, 0.0), |(lat, lon), c| (lat + c.0, lon + c.1));

    let mut bounds = BoundaryBounds {
        north: f64::NEG_INFINITY,
        south: f64::INFINITY,
        east: f64::NEG_INFINITY,
        west: f64::INFINITY,
    };
    for &(lat, lon) in &coordinates {
        bounds.north = bounds.north.max(lat);
        bounds.south = bounds.south.min(lat);
        bounds.east = bounds.east.max(lon);
        bounds.west = bounds.west.min(lon);
    }

    NormalizedBoundary {
        center: (lat_sum / count, lon_sum / count),
        coordinates,
        bounds,
    }
}

/// Fetch and normalize the district boundary.
///
/// Any failure (network, parse, unsupported geometry) logs a warning and
/// returns `None` so the caller falls back to [`DEFAULT_CENTER`] and
/// [`DEFAULT_ZOOM`]. The boundary is decoration; the map must come up
/// without it.
pub async fn load_district_boundary(
    client: &reqwest::Client,
    url: &str,
) -> Option<NormalizedBoundary> {
    let text = match fetch_boundary_text(client, url).await {
        Ok(text) => text,
        Err(err) => {
            warn!("boundary fetch from {} failed: {}; using default viewport", url, err);
            return None;
        }
    };

    match normalize_boundary(&text) {
        Ok(boundary) => Some(boundary),
        Err(err) => {
            warn!("boundary document rejected: {}; using default viewport", err);
            None
        }
    }
}

async fn fetch_boundary_text(client: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    client.get(url).send().await?.error_for_status()?.text().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_ring_is_axis_swapped_in_order() {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-77.02, -12.14], [-77.01, -12.13], [-77.03, -12.15]]]
                }
            }]
        }"#;

        let boundary = normalize_boundary(doc).unwrap();
        assert_eq!(
            boundary.coordinates,
            vec![(-12.14, -77.02), (-12.13, -77.01), (-12.15, -77.03)]
        );

        // Center is the unweighted vertex mean
        let expected_lat = (-12.14 + -12.13 + -12.15) / 3.0;
        let expected_lon = (-77.02 + -77.01 + -77.03) / 3.0;
        assert!((boundary.center.0 - expected_lat).abs() < 1e-12);
        assert!((boundary.center.1 - expected_lon).abs() < 1e-12);

        assert_eq!(boundary.bounds.north, -12.13);
        assert_eq!(boundary.bounds.south, -12.15);
        assert_eq!(boundary.bounds.east, -77.01);
        assert_eq!(boundary.bounds.west, -77.03);
    }

    #[test]
    fn polygon_holes_are_ignored() {
        let doc = r#"{
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
                    [[0.2, 0.2], [0.4, 0.2], [0.4, 0.4], [0.2, 0.2]]
                ]
            }
        }"#;
        let boundary = normalize_boundary(doc).unwrap();
        assert_eq!(boundary.coordinates.len(), 4);
        assert_eq!(boundary.coordinates[1], (0.0, 1.0));
    }

    #[test]
    fn multipolygon_picks_largest_exterior_ring() {
        let doc = r#"{
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                    [[[10.0, 10.0], [11.0, 10.0], [11.0, 11.0], [10.5, 11.5],
                      [10.0, 11.0], [9.5, 10.8], [9.4, 10.4], [9.6, 10.1], [10.0, 10.0]]]
                ]
            }
        }"#;
        let boundary = normalize_boundary(doc).unwrap();
        assert_eq!(boundary.coordinates.len(), 9);
        assert_eq!(boundary.coordinates[0], (10.0, 10.0));
    }

    #[test]
    fn multipolygon_first_wins_ties() {
        let doc = r#"{
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]]],
                    [[[5.0, 5.0], [6.0, 5.0], [5.0, 6.0], [5.0, 5.0]]]
                ]
            }
        }"#;
        let boundary = normalize_boundary(doc).unwrap();
        assert_eq!(boundary.coordinates[0], (0.0, 0.0));
    }

    #[test]
    fn unsupported_geometry_is_rejected() {
        let doc = r#"{
            "geometry": { "type": "Point", "coordinates": [-77.02, -12.14] }
        }"#;
        match normalize_boundary(doc) {
            Err(BoundaryError::UnsupportedGeometry(tag)) => assert_eq!(tag, "Point"),
            other => panic!("expected UnsupportedGeometry, got {:?}", other),
        }
    }

    #[test]
    fn missing_pieces_are_typed_errors() {
        assert!(matches!(
            normalize_boundary(r#"{ "features": [] }"#),
            Err(BoundaryError::MissingFeature)
        ));
        assert!(matches!(
            normalize_boundary(r#"{ "features": [{ "properties": {} }] }"#),
            Err(BoundaryError::MissingGeometry)
        ));
        assert!(matches!(
            normalize_boundary("not json"),
            Err(BoundaryError::Parse(_))
        ));
        assert!(matches!(
            normalize_boundary(r#"{ "geometry": { "type": "Polygon", "coordinates": [] } }"#),
            Err(BoundaryError::EmptyGeometry)
        ));
    }

    #[test]
    fn altitude_component_is_dropped() {
        let doc = r#"{
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-77.02, -12.14, 8.0], [-77.01, -12.13, 9.0], [-77.03, -12.15, 7.0]]]
            }
        }"#;
        let boundary = normalize_boundary(doc).unwrap();
        assert_eq!(boundary.coordinates[0], (-12.14, -77.02));
    }
}
