// ============================================
// Profile Aggregator
// ============================================
//
// Folds a buyer's event history into an archetype preference vector.
//
// profile[a] = SUM over events of action_weight * listing_vector[a]
//
// The fold is commutative and recomputed from the log on demand: same events
// in, same vector out, regardless of read order, and the profile can never
// drift from the event log. Events whose listing has no vector contribute no
// signal and are skipped outright.

pub mod taste_profile;

pub use taste_profile::TasteProfile;

use crate::config::ActionWeights;
use crate::models::{Archetype, BuyerAction, BuyerEvent, ListingVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Accumulated buyer preference weights across the archetype catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyerProfile {
    weights: HashMap<Archetype, f64>,
    /// Per-archetype tally of nope swipes. Never feeds the additive vector;
    /// kept for avoid inference and reporting.
    nope_counts: HashMap<Archetype, u32>,
    /// Events that actually contributed signal (listing had a vector).
    scored_events: u32,
}

impl BuyerProfile {
    pub fn weight(&self, archetype: Archetype) -> f64 {
        self.weights.get(&archetype).copied().unwrap_or(0.0)
    }

    pub fn nope_count(&self, archetype: Archetype) -> u32 {
        self.nope_counts.get(&archetype).copied().unwrap_or(0)
    }

    pub fn scored_events(&self) -> u32 {
        self.scored_events
    }

    /// Cold start: no accumulated signal at all.
    pub fn is_cold_start(&self) -> bool {
        self.weights.values().all(|w| *w <= 0.0)
    }

    pub fn weights(&self) -> &HashMap<Archetype, f64> {
        &self.weights
    }

    /// Archetypes by accumulated weight descending. Ties break by catalog
    /// order, which keeps the top-1 pick canonical: talk-track selection
    /// depends on it.
    pub fn top_archetypes(&self, n: usize) -> Vec<Archetype> {
        let mut ranked: Vec<(Archetype, f64)> = Archetype::ALL
            .iter()
            .filter_map(|a| {
                let w = self.weight(*a);
                (w > 0.0).then_some((*a, w))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.into_iter().take(n).map(|(a, _)| a).collect()
    }

    pub fn top_archetype(&self) -> Option<Archetype> {
        self.top_archetypes(1).into_iter().next()
    }
}

/// Builds buyer profiles from event history.
pub struct ProfileBuilder {
    weights: ActionWeights,
}

impl ProfileBuilder {
    pub fn new(weights: ActionWeights) -> Self {
        Self { weights }
    }

    fn action_weight(&self, action: BuyerAction) -> f64 {
        let weight = match action {
            BuyerAction::Save => self.weights.save,
            BuyerAction::Like => self.weights.like,
            BuyerAction::Skip => self.weights.skip,
            BuyerAction::Nope => self.weights.nope,
        };
        // Affinity weights are non-negative by contract; a negative nope
        // weight is treated as "no additive signal".
        weight.max(0.0)
    }

    /// Fold events (paired with their listings' vectors) into a profile.
    ///
    /// Empty input yields the zero profile; callers special-case cold start
    /// downstream, not here.
    pub fn build_profile<'a, I>(&self, events: I) -> BuyerProfile
    where
        I: IntoIterator<Item = (&'a BuyerEvent, Option<&'a ListingVector>)>,
    {
        let mut profile = BuyerProfile::default();
        let mut skipped = 0u32;

        for (event, vector) in events {
            let Some(vector) = vector else {
                skipped += 1;
                continue;
            };

            if event.action == BuyerAction::Nope {
                for (archetype, weight) in vector.iter() {
                    if weight > 0.0 {
                        *profile.nope_counts.entry(archetype).or_insert(0) += 1;
                    }
                }
            }

            let action_weight = self.action_weight(event.action);
            if action_weight > 0.0 {
                for (archetype, weight) in vector.iter() {
                    if weight.is_finite() && weight > 0.0 {
                        *profile.weights.entry(archetype).or_insert(0.0) += action_weight * weight;
                    }
                }
            }
            profile.scored_events += 1;
        }

        debug!(
            scored_events = profile.scored_events,
            skipped_events = skipped,
            dimensions = profile.weights.len(),
            "Built buyer profile"
        );

        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(action: BuyerAction) -> BuyerEvent {
        BuyerEvent {
            buyer_id: "buyer-1".to_string(),
            listing_id: Uuid::new_v4(),
            action,
            dwell_ms: 1_500,
            occurred_at: Utc::now(),
        }
    }

    fn builder() -> ProfileBuilder {
        ProfileBuilder::new(ActionWeights::default())
    }

    #[test]
    fn empty_history_is_cold_start() {
        let profile =
            builder().build_profile(std::iter::empty::<(&BuyerEvent, Option<&ListingVector>)>());
        assert!(profile.is_cold_start());
        assert!(profile.top_archetypes(3).is_empty());
        assert_eq!(profile.scored_events(), 0);
    }

    #[test]
    fn save_outweighs_like() {
        let save = event(BuyerAction::Save);
        let like = event(BuyerAction::Like);
        let monarch = ListingVector::one_hot(Archetype::Monarch);
        let purist = ListingVector::one_hot(Archetype::Purist);

        let profile =
            builder().build_profile(vec![(&save, Some(&monarch)), (&like, Some(&purist))]);

        assert_eq!(profile.weight(Archetype::Monarch), 3.0);
        assert_eq!(profile.weight(Archetype::Purist), 1.0);
        assert_eq!(profile.top_archetype(), Some(Archetype::Monarch));
    }

    #[test]
    fn fold_is_order_independent() {
        let events: Vec<BuyerEvent> = vec![
            event(BuyerAction::Like),
            event(BuyerAction::Save),
            event(BuyerAction::Like),
            event(BuyerAction::Skip),
        ];
        let vectors = vec![
            ListingVector::one_hot(Archetype::Nomad),
            ListingVector::one_hot(Archetype::Curator),
            ListingVector::one_hot(Archetype::Nomad),
            ListingVector::one_hot(Archetype::Futurist),
        ];

        let forward: Vec<_> = events.iter().zip(vectors.iter().map(Some)).collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = builder().build_profile(forward);
        let b = builder().build_profile(reversed);

        for archetype in Archetype::ALL {
            assert_eq!(a.weight(archetype), b.weight(archetype));
        }
        assert_eq!(a.top_archetypes(8), b.top_archetypes(8));
    }

    #[test]
    fn no_vector_listings_contribute_nothing() {
        let save = event(BuyerAction::Save);
        let like = event(BuyerAction::Like);
        let naturalist = ListingVector::one_hot(Archetype::Naturalist);

        let profile = builder().build_profile(vec![(&save, None), (&like, Some(&naturalist))]);

        assert_eq!(profile.scored_events(), 1);
        assert_eq!(profile.weight(Archetype::Naturalist), 1.0);
    }

    #[test]
    fn nope_never_increases_affinity() {
        let nope = event(BuyerAction::Nope);
        let industrialist = ListingVector::one_hot(Archetype::Industrialist);

        let profile = builder().build_profile(vec![(&nope, Some(&industrialist))]);

        assert_eq!(profile.weight(Archetype::Industrialist), 0.0);
        assert_eq!(profile.nope_count(Archetype::Industrialist), 1);
        assert!(profile.is_cold_start());
    }

    #[test]
    fn majority_archetype_ranks_first() {
        // 7 likes on Monarch listings, 3 on Purist.
        let mut pairs = Vec::new();
        let monarch = ListingVector::one_hot(Archetype::Monarch);
        let purist = ListingVector::one_hot(Archetype::Purist);
        let events: Vec<BuyerEvent> = (0..10).map(|_| event(BuyerAction::Like)).collect();
        for (i, e) in events.iter().enumerate() {
            let v = if i < 7 { &monarch } else { &purist };
            pairs.push((e, Some(v)));
        }

        let profile = builder().build_profile(pairs);
        assert_eq!(
            profile.top_archetypes(2),
            vec![Archetype::Monarch, Archetype::Purist]
        );
    }

    #[test]
    fn ties_break_by_catalog_order() {
        let like_a = event(BuyerAction::Like);
        let like_b = event(BuyerAction::Like);
        let classicist = ListingVector::one_hot(Archetype::Classicist);
        let monarch = ListingVector::one_hot(Archetype::Monarch);

        // Equal weight on both; Monarch precedes Classicist in the catalog.
        let profile = builder()
            .build_profile(vec![(&like_a, Some(&classicist)), (&like_b, Some(&monarch))]);

        assert_eq!(
            profile.top_archetypes(2),
            vec![Archetype::Monarch, Archetype::Classicist]
        );
    }

    #[test]
    fn recomputation_is_idempotent() {
        let save = event(BuyerAction::Save);
        let vector = ListingVector::one_hot(Archetype::Naturalist);
        let pairs = vec![(&save, Some(&vector))];

        let a = builder().build_profile(pairs.clone());
        let b = builder().build_profile(pairs);
        assert_eq!(a.weight(Archetype::Naturalist), b.weight(Archetype::Naturalist));
    }
}
