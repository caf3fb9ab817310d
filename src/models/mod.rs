pub mod sectors;
pub mod stats;

pub use sectors::{
    AudioClip, ClipKind, DistrictDocument, DistrictSector, PointsDocument, SectorPoint,
    SectorPolygon, SectorsDocument,
};
pub use stats::DistrictStats;
