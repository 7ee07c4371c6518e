//! Legacy taste profile: a per-session counter map used where only coarse
//! category affinity is available (anonymous, session-scoped browsing). The
//! vector profile is canonical whenever an event history exists; this view is
//! never blended with it.

use crate::models::Archetype;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-session archetype counters, incremented once per qualifying
/// right-swipe. Persistence and atomic increments live behind
/// [`crate::services::session_taste::TasteCounterStore`]; this is the value
/// type read back out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TasteProfile {
    counts: HashMap<Archetype, u32>,
    total_swipes: u32,
}

impl TasteProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: HashMap<Archetype, u32>, total_swipes: u32) -> Self {
        Self {
            counts,
            total_swipes,
        }
    }

    /// Record one right-swipe on a tagged listing. `Unclassified` swipes
    /// count toward the total but never toward an archetype.
    pub fn record_right_swipe(&mut self, tag: Archetype) {
        self.total_swipes += 1;
        if !tag.is_unclassified() {
            *self.counts.entry(tag).or_insert(0) += 1;
        }
    }

    pub fn count(&self, tag: Archetype) -> u32 {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    pub fn total_swipes(&self) -> u32 {
        self.total_swipes
    }

    pub fn is_empty(&self) -> bool {
        self.total_swipes == 0
    }

    /// Dominant archetype by count, ties broken by catalog order.
    pub fn top_archetype(&self) -> Option<Archetype> {
        Archetype::ALL
            .iter()
            .map(|a| (*a, self.count(*a)))
            .filter(|(_, c)| *c > 0)
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(a, _)| a)
    }
}
