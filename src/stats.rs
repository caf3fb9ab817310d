//! Aggregate noise statistics over measurement points.

use chrono::Utc;

use crate::models::{DistrictStats, SectorPoint};

/// Decibel level above which a sector counts as high-noise.
pub const HIGH_NOISE_THRESHOLD_DB: f64 = 60.0;

/// The eight display bands of the decibel scale, quietest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseBand {
    Silent,
    Quiet,
    Moderate,
    High,
    VeryHigh,
    Excessive,
    Dangerous,
    Extreme,
}

impl NoiseBand {
    pub const ALL: [NoiseBand; 8] = [
        NoiseBand::Silent,
        NoiseBand::Quiet,
        NoiseBand::Moderate,
        NoiseBand::High,
        NoiseBand::VeryHigh,
        NoiseBand::Excessive,
        NoiseBand::Dangerous,
        NoiseBand::Extreme,
    ];

    /// Classify a decibel reading.
    pub fn classify(db: f64) -> NoiseBand {
        if db >= 75.0 {
            NoiseBand::Extreme
        } else if db >= 70.0 {
            NoiseBand::Dangerous
        } else if db >= 65.0 {
            NoiseBand::Excessive
        } else if db >= 60.0 {
            NoiseBand::VeryHigh
        } else if db >= 55.0 {
            NoiseBand::High
        } else if db >= 50.0 {
            NoiseBand::Moderate
        } else if db >= 45.0 {
            NoiseBand::Quiet
        } else {
            NoiseBand::Silent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NoiseBand::Silent => "Very quiet",
            NoiseBand::Quiet => "Quiet",
            NoiseBand::Moderate => "Moderate",
            NoiseBand::High => "High",
            NoiseBand::VeryHigh => "Very high",
            NoiseBand::Excessive => "Excessive",
            NoiseBand::Dangerous => "Dangerous",
            NoiseBand::Extreme => "Extreme",
        }
    }

    /// Display range, e.g. `"45-50 dB"`.
    pub fn range_label(self) -> &'static str {
        match self {
            NoiseBand::Silent => "<45 dB",
            NoiseBand::Quiet => "45-50 dB",
            NoiseBand::Moderate => "50-55 dB",
            NoiseBand::High => "55-60 dB",
            NoiseBand::VeryHigh => "60-65 dB",
            NoiseBand::Excessive => "65-70 dB",
            NoiseBand::Dangerous => "70-75 dB",
            NoiseBand::Extreme => ">75 dB",
        }
    }

    /// Hex color used for this band across the panels.
    pub fn color(self) -> &'static str {
        match self {
            NoiseBand::Silent => "#16a34a",
            NoiseBand::Quiet => "#eab308",
            NoiseBand::Moderate => "#ca8a04",
            NoiseBand::High => "#ea580c",
            NoiseBand::VeryHigh => "#dc2626",
            NoiseBand::Excessive => "#2563eb",
            NoiseBand::Dangerous => "#7c3aed",
            NoiseBand::Extreme => "#6b7280",
        }
    }
}

/// Rebuild the district aggregates from measurement points.
pub fn compute_district_stats(points: &[SectorPoint]) -> DistrictStats {
    if points.is_empty() {
        return DistrictStats {
            average_db: 0.0,
            max_db: 0.0,
            min_db: 0.0,
            high_noise_sectors: 0,
            total_audios: Some(0),
            generated_at: Some(Utc::now().to_rfc3339()),
        };
    }

    let sum: f64 = points.iter().map(|p| p.decibels).sum();
    let max_db = points.iter().map(|p| p.decibels).fold(f64::NEG_INFINITY, f64::max);
    let min_db = points.iter().map(|p| p.decibels).fold(f64::INFINITY, f64::min);
    let high_noise_sectors = points
        .iter()
        .filter(|p| p.decibels > HIGH_NOISE_THRESHOLD_DB)
        .count();
    let total_audios = points.iter().map(|p| p.audios.len()).sum();

    DistrictStats {
        average_db: (sum / points.len() as f64).round(),
        max_db,
        min_db,
        high_noise_sectors,
        total_audios: Some(total_audios),
        generated_at: Some(Utc::now().to_rfc3339()),
    }
}

/// Count points per noise band, ordered as [`NoiseBand::ALL`].
pub fn level_distribution(points: &[SectorPoint]) -> [(NoiseBand, usize); 8] {
    let mut counts = [0usize; 8];
    for point in points {
        let band = NoiseBand::classify(point.decibels);
        let slot = NoiseBand::ALL.iter().position(|b| *b == band).unwrap_or(0);
        counts[slot] += 1;
    }

    let mut out = [(NoiseBand::Silent, 0usize); 8];
    for (i, band) in NoiseBand::ALL.into_iter().enumerate() {
        out[i] = (band, counts[i]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudioClip, ClipKind};

    fn point(id: u32, db: f64, audio_count: usize) -> SectorPoint {
        SectorPoint {
            id,
            name: format!("Sector {}", id),
            lat: -12.14,
            lon: -77.02,
            decibels: db,
            audios: (0..audio_count)
                .map(|i| AudioClip {
                    title: format!("clip {}", i),
                    description: String::new(),
                    url: format!("/audios/{}_{}.mp3", id, i),
                    kind: ClipKind::Ambient,
                })
                .collect(),
            timestamp: None,
        }
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(NoiseBand::classify(30.0), NoiseBand::Silent);
        assert_eq!(NoiseBand::classify(44.9), NoiseBand::Silent);
        assert_eq!(NoiseBand::classify(45.0), NoiseBand::Quiet);
        assert_eq!(NoiseBand::classify(55.0), NoiseBand::High);
        assert_eq!(NoiseBand::classify(60.0), NoiseBand::VeryHigh);
        assert_eq!(NoiseBand::classify(74.9), NoiseBand::Dangerous);
        assert_eq!(NoiseBand::classify(75.0), NoiseBand::Extreme);
        assert_eq!(NoiseBand::classify(90.0), NoiseBand::Extreme);
    }

    #[test]
    fn stats_aggregate_and_round() {
        let points = vec![point(0, 55.0, 2), point(1, 68.0, 2), point(2, 42.0, 1)];
        let stats = compute_district_stats(&points);

        assert_eq!(stats.average_db, 55.0); // (55 + 68 + 42) / 3 = 55
        assert_eq!(stats.max_db, 68.0);
        assert_eq!(stats.min_db, 42.0);
        assert_eq!(stats.high_noise_sectors, 1);
        assert_eq!(stats.total_audios, Some(5));
        assert!(stats.generated_at.is_some());
    }

    #[test]
    fn stats_on_empty_input_are_zeroed() {
        let stats = compute_district_stats(&[]);
        assert_eq!(stats.average_db, 0.0);
        assert_eq!(stats.high_noise_sectors, 0);
        assert_eq!(stats.total_audios, Some(0));
    }

    #[test]
    fn distribution_counts_every_point_once() {
        let points = vec![
            point(0, 38.0, 0),
            point(1, 48.0, 0),
            point(2, 48.5, 0),
            point(3, 78.0, 0),
        ];
        let dist = level_distribution(&points);

        assert_eq!(dist[0], (NoiseBand::Silent, 1));
        assert_eq!(dist[1], (NoiseBand::Quiet, 2));
        assert_eq!(dist[7], (NoiseBand::Extreme, 1));
        let total: usize = dist.iter().map(|(_, n)| n).sum();
        assert_eq!(total, points.len());
    }
}
