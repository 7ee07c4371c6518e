// ============================================
// Event Log Accessor
// ============================================
//
// Read seam over the external buyer event store plus the external listing
// vector cache. The engine consumes both; it owns neither. Read order is
// deliberately unspecified: the profile fold is commutative, so out-of-order
// reads must not change results.

use crate::models::{BuyerEvent, ListingVector};
use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Dwell times above this are recorded at the cap. Keeps a tab left open
/// overnight from dominating dwell analytics.
pub const MAX_DWELL_MS: u64 = 600_000;

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("event store error: {0}")]
    StoreError(String),
}

pub type Result<T> = std::result::Result<T, EventLogError>;

/// Read access to a buyer's historical events. No ordering guarantee.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventLogReader: Send + Sync {
    async fn events_for_buyer(&self, buyer_id: &str) -> Result<Vec<BuyerEvent>>;
}

/// Read access to derived listing vectors. `Ok(None)` means the listing has
/// no archetype signal and cannot be scored on the vibe axis.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingVectorSource: Send + Sync {
    async fn vector_for(&self, listing_id: Uuid) -> Result<Option<ListingVector>>;
}

/// In-memory event log for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: DashMap<String, Vec<BuyerEvent>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event. Ingestion boundary: dwell time is capped here so the
    /// aggregator can assume validated input.
    pub fn append(&self, mut event: BuyerEvent) {
        if event.dwell_ms > MAX_DWELL_MS {
            debug!(
                buyer_id = %event.buyer_id,
                dwell_ms = event.dwell_ms,
                "Capping oversized dwell time"
            );
            event.dwell_ms = MAX_DWELL_MS;
        }
        self.events
            .entry(event.buyer_id.clone())
            .or_default()
            .push(event);
    }
}

#[async_trait]
impl EventLogReader for InMemoryEventLog {
    async fn events_for_buyer(&self, buyer_id: &str) -> Result<Vec<BuyerEvent>> {
        Ok(self
            .events
            .get(buyer_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }
}

/// In-memory listing vector cache for tests and embedded use.
#[derive(Debug, Default)]
pub struct InMemoryVectorSource {
    vectors: DashMap<Uuid, Option<ListingVector>>,
}

impl InMemoryVectorSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, listing_id: Uuid, vector: Option<ListingVector>) {
        self.vectors.insert(listing_id, vector);
    }
}

#[async_trait]
impl ListingVectorSource for InMemoryVectorSource {
    async fn vector_for(&self, listing_id: Uuid) -> Result<Option<ListingVector>> {
        Ok(self
            .vectors
            .get(&listing_id)
            .map(|entry| entry.clone())
            .unwrap_or(None))
    }
}
