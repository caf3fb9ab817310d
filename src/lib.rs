//! Backend for a crowd-sourced district noise map.
//!
//! The crate owns everything below the rendering layer: typed fixture
//! documents for sector measurements, aggregate noise statistics, the
//! district boundary normalizer, and the tour mix engine that overlays the
//! ambient recordings of visited sectors into a single downloadable WAV.

pub mod audio;
pub mod boundary;
pub mod fixtures;
pub mod models;
pub mod session;
pub mod stats;
pub mod tour;

pub use boundary::{load_district_boundary, normalize_boundary, NormalizedBoundary};
pub use session::{MixRequests, TourSession};
pub use tour::{render_tour_mix, HttpClipSource, MixSettings, TourMix};
