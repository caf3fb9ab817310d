use serde::{Deserialize, Serialize};

/// Aggregate noise figures for a district.
///
/// Embedded verbatim in the fixture documents; `stats::compute_district_stats`
/// rebuilds it from measurement points and fills the optional fields.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DistrictStats {
    /// Mean decibel level across all points, rounded to the nearest integer.
    pub average_db: f64,
    pub max_db: f64,
    pub min_db: f64,
    /// Points louder than the high-noise threshold (60 dB).
    pub high_noise_sectors: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_audios: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}
