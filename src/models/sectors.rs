use serde::{Deserialize, Serialize};

use super::stats::DistrictStats;

/// Category of an ambient recording.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Ambient,
    Traffic,
    Commercial,
}

/// One recording attached to a sector.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AudioClip {
    pub title: String,
    pub description: String,
    /// Where the raw clip bytes live. Fetched with a plain GET.
    pub url: String,
    pub kind: ClipKind,
}

/// A measurement point: one sector's position, noise level, and recordings.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SectorPoint {
    pub id: u32,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub decibels: f64,
    pub audios: Vec<AudioClip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SectorPoint {
    /// The clip a tour mix uses for this sector. Only the first recording
    /// participates in mixing; the rest exist for on-demand playback.
    pub fn primary_clip(&self) -> Option<&AudioClip> {
        self.audios.first()
    }
}

/// Polygon styling data for one sector on the map.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SectorPolygon {
    pub id: u32,
    pub name: String,
    /// Ring of (lat, lon) vertices in renderer axis order.
    pub polygon: Vec<[f64; 2]>,
    pub sector_type: String,
    /// Hex fill color assigned from the sector palette.
    pub color: String,
}

/// A sector record in the merged extraction document, before it is split
/// into polygon and point fixtures.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DistrictSector {
    pub id: u32,
    pub name: String,
    pub polygon: Vec<[f64; 2]>,
    pub sector_type: String,
    pub lat: f64,
    pub lon: f64,
    pub decibels: f64,
    pub audios: Vec<AudioClip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// The merged extraction output covering a whole district.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DistrictDocument {
    pub district: String,
    pub city: String,
    pub country: String,
    pub timestamp: String,
    pub total_sectors: usize,
    pub stats: DistrictStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<String>,
    pub sectors: Vec<DistrictSector>,
}

/// Polygon fixture consumed by the map layer.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SectorsDocument {
    pub district: String,
    pub city: String,
    pub country: String,
    pub timestamp: String,
    pub total_sectors: usize,
    pub stats: DistrictStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<String>,
    pub sectors: Vec<SectorPolygon>,
}

/// Measurement fixture consumed by the panels and the tour mix engine.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PointsDocument {
    pub district: String,
    pub city: String,
    pub country: String,
    pub timestamp: String,
    pub total_points: usize,
    pub stats: DistrictStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<String>,
    pub points: Vec<SectorPoint>,
}
