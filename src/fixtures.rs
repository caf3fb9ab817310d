//! Loading and shaping of the static fixture documents.
//!
//! The extraction pipeline produces one merged document per district;
//! [`split_district_document`] turns it into the two fixtures the map
//! consumes: polygon styling data (`sectors`) and measurement points
//! (`points`).

use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::models::{
    DistrictDocument, PointsDocument, SectorPoint, SectorPolygon, SectorsDocument,
};

/// Fill colors assigned to sector polygons, cycled when a district has more
/// sectors than the palette has entries.
pub const SECTOR_PALETTE: [&str; 14] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FECA57", "#FF9FF3", "#54A0FF", "#5F27CD",
    "#00D2D3", "#FF9F43", "#10AC84", "#EE5A24", "#C44569", "#A55EEA",
];

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn read_to_string(path: &Path) -> Result<String, FixtureError> {
    fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, text: &str) -> Result<T, FixtureError> {
    serde_json::from_str(text).map_err(|source| FixtureError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_district_document(path: &Path) -> Result<DistrictDocument, FixtureError> {
    let text = read_to_string(path)?;
    parse(path, &text)
}

pub fn load_points_document(path: &Path) -> Result<PointsDocument, FixtureError> {
    let text = read_to_string(path)?;
    parse(path, &text)
}

pub fn load_sectors_document(path: &Path) -> Result<SectorsDocument, FixtureError> {
    let text = read_to_string(path)?;
    parse(path, &text)
}

/// Split the merged extraction document into polygon and point fixtures.
///
/// Sector polygons get palette colors in document order; the shared header
/// and statistics are copied onto both outputs.
pub fn split_district_document(doc: &DistrictDocument) -> (SectorsDocument, PointsDocument) {
    let sectors = doc
        .sectors
        .iter()
        .enumerate()
        .map(|(i, sector)| SectorPolygon {
            id: sector.id,
            name: sector.name.clone(),
            polygon: sector.polygon.clone(),
            sector_type: sector.sector_type.clone(),
            color: SECTOR_PALETTE[i % SECTOR_PALETTE.len()].to_string(),
        })
        .collect();

    let points = doc
        .sectors
        .iter()
        .map(|sector| SectorPoint {
            id: sector.id,
            name: sector.name.clone(),
            lat: sector.lat,
            lon: sector.lon,
            decibels: sector.decibels,
            audios: sector.audios.clone(),
            timestamp: sector.timestamp.clone(),
        })
        .collect();

    let sectors_doc = SectorsDocument {
        district: doc.district.clone(),
        city: doc.city.clone(),
        country: doc.country.clone(),
        timestamp: doc.timestamp.clone(),
        total_sectors: doc.total_sectors,
        stats: doc.stats.clone(),
        extraction_method: doc.extraction_method.clone(),
        sectors,
    };

    let points_doc = PointsDocument {
        district: doc.district.clone(),
        city: doc.city.clone(),
        country: doc.country.clone(),
        timestamp: doc.timestamp.clone(),
        // one measurement point per sector
        total_points: doc.total_sectors,
        stats: doc.stats.clone(),
        extraction_method: doc.extraction_method.clone(),
        points,
    };

    (sectors_doc, points_doc)
}

/// Write a fixture document as pretty-printed JSON.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), FixtureError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| FixtureError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, text).map_err(|source| FixtureError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MERGED: &str = r#"{
        "district": "Barranco",
        "city": "Lima",
        "country": "Perú",
        "timestamp": "2024-05-01T12:00:00Z",
        "totalSectors": 2,
        "stats": {
            "averageDb": 61.0,
            "maxDb": 68.0,
            "minDb": 55.0,
            "highNoiseSectors": 1
        },
        "extractionMethod": "manual-survey",
        "sectors": [
            {
                "id": 0,
                "name": "Sector SS-1A",
                "polygon": [[-12.137, -77.024], [-12.138, -77.023], [-12.139, -77.025]],
                "sectorType": "SS-1A",
                "lat": -12.137,
                "lon": -77.024,
                "decibels": 55.0,
                "audios": [
                    {
                        "title": "Residential north",
                        "description": "Light traffic",
                        "url": "/audios/ss1a_ambient.mp3",
                        "kind": "ambient"
                    }
                ]
            },
            {
                "id": 1,
                "name": "Sector SS-1B",
                "polygon": [[-12.139, -77.022], [-12.140, -77.021], [-12.141, -77.023]],
                "sectorType": "SS-1B",
                "lat": -12.1395,
                "lon": -77.022,
                "decibels": 68.0,
                "audios": []
            }
        ]
    }"#;

    #[test]
    fn merged_document_parses() {
        let doc: DistrictDocument = serde_json::from_str(MERGED).unwrap();
        assert_eq!(doc.total_sectors, 2);
        assert_eq!(doc.sectors[0].audios.len(), 1);
        assert_eq!(doc.extraction_method.as_deref(), Some("manual-survey"));
    }

    #[test]
    fn split_assigns_palette_and_preserves_counts() {
        let doc: DistrictDocument = serde_json::from_str(MERGED).unwrap();
        let (sectors_doc, points_doc) = split_district_document(&doc);

        assert_eq!(sectors_doc.sectors.len(), 2);
        assert_eq!(points_doc.points.len(), 2);
        assert_eq!(points_doc.total_points, 2);
        assert_eq!(sectors_doc.sectors[0].color, SECTOR_PALETTE[0]);
        assert_eq!(sectors_doc.sectors[1].color, SECTOR_PALETTE[1]);

        // Point records carry the measurement side of the merged sector
        assert_eq!(points_doc.points[1].decibels, 68.0);
        assert!(points_doc.points[1].audios.is_empty());
    }

    #[test]
    fn palette_cycles_past_fourteen_sectors() {
        let mut doc: DistrictDocument = serde_json::from_str(MERGED).unwrap();
        let template = doc.sectors[0].clone();
        doc.sectors = (0..16)
            .map(|i| {
                let mut s = template.clone();
                s.id = i;
                s
            })
            .collect();
        doc.total_sectors = 16;

        let (sectors_doc, _) = split_district_document(&doc);
        assert_eq!(sectors_doc.sectors[14].color, SECTOR_PALETTE[0]);
        assert_eq!(sectors_doc.sectors[15].color, SECTOR_PALETTE[1]);
    }

    #[test]
    fn documents_round_trip_through_files() {
        let doc: DistrictDocument = serde_json::from_str(MERGED).unwrap();
        let (sectors_doc, points_doc) = split_district_document(&doc);

        let dir = tempfile::tempdir().unwrap();
        let sectors_path = dir.path().join("sectors.json");
        let points_path = dir.path().join("points.json");
        write_json_pretty(&sectors_path, &sectors_doc).unwrap();
        write_json_pretty(&points_path, &points_doc).unwrap();

        let reloaded = load_points_document(&points_path).unwrap();
        assert_eq!(reloaded.points.len(), 2);
        let reloaded = load_sectors_document(&sectors_path).unwrap();
        assert_eq!(reloaded.sectors.len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_points_document(Path::new("/nonexistent/points.json")).unwrap_err();
        assert!(matches!(err, FixtureError::Io { .. }));
    }
}
