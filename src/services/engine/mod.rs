// ============================================
// Match Engine
// ============================================
//
// End-to-end evaluation of one swipe:
// 1. Read the buyer's event history and the target listing's vector
// 2. Rebuild the buyer profile from the log (always consistent, never drifts)
// 3. Score the profile against the target vector
// 4. Apply the decision policy (lead creation, dedup, notification)
//
// The pure stages never block; only the store reads await. An unscoreable
// target (no vector) short-circuits to score 0 and never creates a lead,
// whatever the action: callers fall back to non-vibe signals.

use crate::config::EngineConfig;
use crate::models::{
    Archetype, BuyerAction, BuyerCriteria, BuyerEvent, ListingFacts, ListingVector, SwipeOutcome,
};
use crate::services::decision::{DecisionContext, DecisionError, DecisionPolicy, LeadStore};
use crate::services::event_log::{EventLogError, EventLogReader, ListingVectorSource};
use crate::services::profile_builder::{BuyerProfile, ProfileBuilder};
use crate::services::scoring::MatchScorer;
use crate::services::session_taste::{SessionTasteError, TasteCounterStore};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("event log read failed: {0}")]
    EventLog(#[from] EventLogError),

    #[error("decision policy failed: {0}")]
    Decision(#[from] DecisionError),

    #[error("session taste store failed: {0}")]
    SessionTaste(#[from] SessionTasteError),

    #[error("session taste store not configured")]
    SessionStoreMissing,
}

pub type Result<T> = std::result::Result<T, EngineError>;

pub struct MatchEngine {
    profile_builder: ProfileBuilder,
    scorer: MatchScorer,
    policy: DecisionPolicy,
    event_log: Arc<dyn EventLogReader>,
    vector_source: Arc<dyn ListingVectorSource>,
    lead_store: Arc<dyn LeadStore>,
    /// Optional backing for the legacy anonymous-session path.
    taste_store: Option<Arc<dyn TasteCounterStore>>,
}

impl MatchEngine {
    pub fn new(
        config: EngineConfig,
        event_log: Arc<dyn EventLogReader>,
        vector_source: Arc<dyn ListingVectorSource>,
        lead_store: Arc<dyn LeadStore>,
    ) -> Self {
        Self {
            profile_builder: ProfileBuilder::new(config.weights.clone()),
            scorer: MatchScorer::new(config.scoring.clone()),
            policy: DecisionPolicy::new(config.policy.clone()),
            event_log,
            vector_source,
            lead_store,
            taste_store: None,
        }
    }

    /// Attach a session taste store, enabling the legacy anonymous path.
    pub fn with_taste_store(mut self, taste_store: Arc<dyn TasteCounterStore>) -> Self {
        self.taste_store = Some(taste_store);
        self
    }

    /// Evaluate one swipe without hard criteria.
    pub async fn evaluate_swipe(
        &self,
        buyer_id: &str,
        listing_id: Uuid,
        action: BuyerAction,
    ) -> Result<SwipeOutcome> {
        self.evaluate_swipe_detailed(
            buyer_id,
            listing_id,
            action,
            &BuyerCriteria::default(),
            &ListingFacts::default(),
        )
        .await
    }

    /// Evaluate one swipe, layering deterministic bonuses from the buyer's
    /// hard criteria on top of the archetype score.
    pub async fn evaluate_swipe_detailed(
        &self,
        buyer_id: &str,
        listing_id: Uuid,
        action: BuyerAction,
        criteria: &BuyerCriteria,
        facts: &ListingFacts,
    ) -> Result<SwipeOutcome> {
        let (events, target_vector) = tokio::try_join!(
            self.event_log.events_for_buyer(buyer_id),
            self.vector_source.vector_for(listing_id),
        )?;

        let profile = self.build_profile_from(&events).await?;

        let Some(target_vector) = target_vector else {
            debug!(
                buyer_id = %buyer_id,
                listing_id = %listing_id,
                "Target listing has no archetype vector, skipping vibe axis"
            );
            return Ok(SwipeOutcome {
                match_score: 0,
                buyer_top_archetypes: profile.top_archetypes(self.policy_top_n()),
                listing_top_archetypes: Vec::new(),
                lead_created: false,
                hot_lead: false,
                lead: None,
                notification: None,
            });
        };

        let score = self
            .scorer
            .score_with_bonus(&profile, &target_vector, criteria, facts);

        let decision = self
            .policy
            .apply(
                DecisionContext {
                    buyer_id,
                    listing_id,
                    action,
                    score,
                    profile: &profile,
                    listing_vector: &target_vector,
                },
                self.lead_store.as_ref(),
            )
            .await?;

        info!(
            buyer_id = %buyer_id,
            listing_id = %listing_id,
            action = action.as_str(),
            score,
            lead_created = decision.lead_created,
            hot_lead = decision.hot_lead,
            "Swipe evaluated"
        );

        Ok(SwipeOutcome {
            match_score: score,
            buyer_top_archetypes: profile.top_archetypes(self.policy_top_n()),
            listing_top_archetypes: target_vector.top_archetypes(self.policy_top_n()),
            lead_created: decision.lead_created,
            hot_lead: decision.hot_lead,
            lead: decision.lead,
            notification: decision.notification,
        })
    }

    /// Recompute the buyer's profile from the event log. Public so callers
    /// can inspect a profile without evaluating a swipe.
    pub async fn profile_for(&self, buyer_id: &str) -> Result<BuyerProfile> {
        let events = self.event_log.events_for_buyer(buyer_id).await?;
        self.build_profile_from(&events).await
    }

    async fn build_profile_from(&self, events: &[BuyerEvent]) -> Result<BuyerProfile> {
        // One vector fetch per distinct listing in the history.
        let mut vectors: HashMap<Uuid, Option<ListingVector>> = HashMap::new();
        for event in events {
            if !vectors.contains_key(&event.listing_id) {
                let vector = self.vector_source.vector_for(event.listing_id).await?;
                vectors.insert(event.listing_id, vector);
            }
        }

        let pairs = events.iter().map(|event| {
            (
                event,
                vectors.get(&event.listing_id).and_then(|v| v.as_ref()),
            )
        });
        Ok(self.profile_builder.build_profile(pairs))
    }

    /// Legacy anonymous-session path: record a right-swipe against the
    /// session's taste counters. Requires a taste store.
    pub async fn record_session_right_swipe(
        &self,
        session_id: &str,
        tag: Archetype,
    ) -> Result<()> {
        let store = self
            .taste_store
            .as_ref()
            .ok_or(EngineError::SessionStoreMissing)?;
        store.record_right_swipe(session_id, tag).await?;
        Ok(())
    }

    /// Legacy anonymous-session score for a tagged listing.
    pub async fn legacy_score_for(&self, session_id: &str, tag: Archetype) -> Result<u8> {
        let store = self
            .taste_store
            .as_ref()
            .ok_or(EngineError::SessionStoreMissing)?;
        let taste = store.load(session_id).await?;
        Ok(self.scorer.legacy_score(&taste, tag))
    }

    fn policy_top_n(&self) -> usize {
        // The policy owns the configured top-N; keep outcomes consistent
        // with the leads it creates.
        self.policy.top_n()
    }
}
