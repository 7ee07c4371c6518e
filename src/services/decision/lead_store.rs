//! Lead storage seam. The engine's dedup contract lives here: creation is a
//! single atomic insert-if-absent keyed by (buyer, listing), so two
//! concurrent qualifying swipes can never both create a lead. A SQL-backed
//! implementation would use a unique index on (buyer_id, listing_id) and map
//! the conflict row to `AlreadyExists`.

use super::Result;
use crate::models::Lead;
use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

/// Outcome of an insert-if-absent attempt. A uniqueness conflict from a
/// concurrent create reports as `AlreadyExists`, same as a pre-existing lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadInsert {
    Created,
    AlreadyExists,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Atomically create the lead unless one already exists for its
    /// (buyer, listing) pair.
    async fn create_if_absent(&self, lead: Lead) -> Result<LeadInsert>;

    async fn get(&self, buyer_id: &str, listing_id: Uuid) -> Result<Option<Lead>>;
}

/// In-memory lead store for tests and embedded use. DashMap's entry API makes
/// the check-then-create a single atomic operation.
#[derive(Debug, Default)]
pub struct InMemoryLeadStore {
    leads: DashMap<(String, Uuid), Lead>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn create_if_absent(&self, lead: Lead) -> Result<LeadInsert> {
        let key = (lead.buyer_id.clone(), lead.listing_id);
        match self.leads.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => Ok(LeadInsert::AlreadyExists),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(lead);
                Ok(LeadInsert::Created)
            }
        }
    }

    async fn get(&self, buyer_id: &str, listing_id: Uuid) -> Result<Option<Lead>> {
        Ok(self
            .leads
            .get(&(buyer_id.to_string(), listing_id))
            .map(|entry| entry.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Archetype, ListingVector};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn lead(buyer: &str, listing_id: Uuid) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            buyer_id: buyer.to_string(),
            listing_id,
            match_score: 90,
            hot: false,
            buyer_vector: HashMap::new(),
            listing_vector: ListingVector::one_hot(Archetype::Purist),
            buyer_top_archetypes: vec![Archetype::Purist],
            listing_top_archetypes: vec![Archetype::Purist],
            talk_track: "pitch".to_string(),
            avoid_list: vec![],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn only_the_first_insert_wins() {
        let store = InMemoryLeadStore::new();
        let listing_id = Uuid::new_v4();

        let first = store.create_if_absent(lead("buyer-1", listing_id)).await.unwrap();
        let second = store.create_if_absent(lead("buyer-1", listing_id)).await.unwrap();

        assert_eq!(first, LeadInsert::Created);
        assert_eq!(second, LeadInsert::AlreadyExists);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn different_pairs_do_not_collide() {
        let store = InMemoryLeadStore::new();
        let listing_id = Uuid::new_v4();

        store.create_if_absent(lead("buyer-1", listing_id)).await.unwrap();
        let other = store
            .create_if_absent(lead("buyer-2", listing_id))
            .await
            .unwrap();

        assert_eq!(other, LeadInsert::Created);
        assert_eq!(store.len(), 2);
        assert!(store.get("buyer-2", listing_id).await.unwrap().is_some());
        assert!(store.get("buyer-3", listing_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_creates_yield_exactly_one_lead() {
        let store = Arc::new(InMemoryLeadStore::new());
        let listing_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create_if_absent(lead("buyer-1", listing_id)).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() == LeadInsert::Created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
    }
}
