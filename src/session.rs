//! Session-scoped state for a listening tour.
//!
//! Nothing here persists: the visited list dies with the session, and mix
//! request tokens only order the mixes issued within it.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{PointsDocument, SectorPoint};

/// Ordered record of the sectors a user interacted with during one session.
///
/// Append-only until [`TourSession::new_tour`]; owned by the UI controller
/// and handed to the mix engine as a plain argument.
#[derive(Debug, Default, Clone)]
pub struct TourSession {
    visited: Vec<u32>,
}

impl TourSession {
    pub fn new() -> Self {
        TourSession::default()
    }

    /// Record a visit. Re-selecting the sector that is already current is
    /// not a new stop on the tour.
    pub fn visit(&mut self, sector_id: u32) {
        if self.visited.last() != Some(&sector_id) {
            self.visited.push(sector_id);
        }
    }

    /// Visited sector ids in insertion order.
    pub fn visited(&self) -> &[u32] {
        &self.visited
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Drop the history for a fresh tour.
    pub fn new_tour(&mut self) {
        self.visited.clear();
    }

    /// Resolve the visited ids against a points document, preserving order.
    /// Ids with no matching point are dropped.
    pub fn resolve(&self, doc: &PointsDocument) -> Vec<SectorPoint> {
        self.visited
            .iter()
            .filter_map(|id| doc.points.iter().find(|p| p.id == *id).cloned())
            .collect()
    }
}

/// Monotonic generation counter for mix requests.
///
/// Each mix invocation takes a token from [`MixRequests::begin`]; when the
/// mix completes, the caller keeps the result only if the token is still
/// current. A mix overtaken by a newer request is discarded instead of
/// racing it for last-write-wins.
#[derive(Debug, Default)]
pub struct MixRequests {
    counter: AtomicU64,
}

impl MixRequests {
    pub fn new() -> Self {
        MixRequests::default()
    }

    /// Issue the next token, invalidating all earlier ones.
    pub fn begin(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `token` is still the latest issued request.
    pub fn is_current(&self, token: u64) -> bool {
        self.counter.load(Ordering::SeqCst) == token
    }
}
