// ============================================
// Decision Policy
// ============================================
//
// Turns a match score plus the action taken into lead-creation and
// notification decisions. Invariant: at most one Lead per (buyer, listing)
// pair, enforced by an atomic insert-if-absent at the storage boundary; a
// uniqueness conflict is treated identically to "lead already existed" and
// suppresses the duplicate notification.

pub mod lead_store;
pub mod talk_track;

pub use lead_store::{InMemoryLeadStore, LeadInsert, LeadStore};

use crate::config::PolicyConfig;
use crate::models::{
    Archetype, BuyerAction, Lead, ListingVector, Notification, NotificationPriority,
};
use crate::services::profile_builder::BuyerProfile;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("lead store error: {0}")]
    LeadStoreError(String),
}

pub type Result<T> = std::result::Result<T, DecisionError>;

/// Pure verdict for one (action, score) pair, before dedup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub create_lead: bool,
    pub hot: bool,
    pub priority: Option<NotificationPriority>,
}

impl Verdict {
    const NO_OP: Verdict = Verdict {
        create_lead: false,
        hot: false,
        priority: None,
    };
}

/// Everything the policy needs to assemble a lead for one swipe.
#[derive(Debug)]
pub struct DecisionContext<'a> {
    pub buyer_id: &'a str,
    pub listing_id: Uuid,
    pub action: BuyerAction,
    pub score: u8,
    pub profile: &'a BuyerProfile,
    pub listing_vector: &'a ListingVector,
}

/// Result of applying the policy, dedup included.
#[derive(Debug, Default)]
pub struct DecisionOutcome {
    pub lead_created: bool,
    pub hot_lead: bool,
    pub lead: Option<Lead>,
    pub notification: Option<Notification>,
}

pub struct DecisionPolicy {
    config: PolicyConfig,
}

impl DecisionPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Configured top-N carried on leads and outcomes.
    pub fn top_n(&self) -> usize {
        self.config.top_n
    }

    /// Threshold logic, independent of storage:
    /// - bypass action -> lead regardless of score; Low priority when the
    ///   score alone would not have qualified
    /// - positive action + score >= lead threshold -> lead, High priority
    /// - score >= hot threshold -> hot, Critical priority
    /// - anything else -> no lead, no notification
    pub fn verdict(&self, action: BuyerAction, score: u8) -> Verdict {
        let positive = self.config.positive_actions.contains(&action);
        let bypass = self.config.bypass_actions.contains(&action);

        if !positive && !bypass {
            return Verdict::NO_OP;
        }

        let qualified = score >= self.config.lead_threshold;
        let hot = score >= self.config.hot_threshold;

        if qualified {
            Verdict {
                create_lead: true,
                hot,
                priority: Some(if hot {
                    NotificationPriority::Critical
                } else {
                    NotificationPriority::High
                }),
            }
        } else if bypass {
            // Explicit intent outweighs the score, but the agent can triage
            // it with the batch.
            Verdict {
                create_lead: true,
                hot: false,
                priority: Some(NotificationPriority::Low),
            }
        } else {
            Verdict::NO_OP
        }
    }

    /// Evaluate one swipe end to end: verdict, lead assembly, atomic
    /// insert-if-absent, notification. `AlreadyExists` (pre-existing lead or
    /// a concurrent create that won the race) is a silent no-op.
    pub async fn apply(
        &self,
        ctx: DecisionContext<'_>,
        store: &dyn LeadStore,
    ) -> Result<DecisionOutcome> {
        let verdict = self.verdict(ctx.action, ctx.score);
        if !verdict.create_lead {
            return Ok(DecisionOutcome::default());
        }

        let lead = self.build_lead(&ctx, verdict.hot);

        match store.create_if_absent(lead.clone()).await? {
            LeadInsert::Created => {
                info!(
                    buyer_id = %ctx.buyer_id,
                    listing_id = %ctx.listing_id,
                    score = ctx.score,
                    hot = verdict.hot,
                    "Lead created"
                );
                let notification = verdict
                    .priority
                    .map(|priority| build_notification(&ctx, &lead, priority));
                Ok(DecisionOutcome {
                    lead_created: true,
                    hot_lead: verdict.hot,
                    lead: Some(lead),
                    notification,
                })
            }
            LeadInsert::AlreadyExists => {
                debug!(
                    buyer_id = %ctx.buyer_id,
                    listing_id = %ctx.listing_id,
                    "Lead already exists, suppressing duplicate"
                );
                Ok(DecisionOutcome::default())
            }
        }
    }

    fn build_lead(&self, ctx: &DecisionContext<'_>, hot: bool) -> Lead {
        let top = ctx.profile.top_archetype();
        Lead {
            id: Uuid::new_v4(),
            buyer_id: ctx.buyer_id.to_string(),
            listing_id: ctx.listing_id,
            match_score: ctx.score,
            hot,
            buyer_vector: ctx.profile.weights().clone(),
            listing_vector: ctx.listing_vector.clone(),
            buyer_top_archetypes: ctx.profile.top_archetypes(self.config.top_n),
            listing_top_archetypes: ctx.listing_vector.top_archetypes(self.config.top_n),
            talk_track: talk_track::talk_track_for(top),
            avoid_list: talk_track::avoid_list_for(top),
            created_at: Utc::now(),
        }
    }
}

fn build_notification(
    ctx: &DecisionContext<'_>,
    lead: &Lead,
    priority: NotificationPriority,
) -> Notification {
    // Archetypes both sides agree on, in catalog order.
    let matched: Vec<Archetype> = Archetype::ALL
        .iter()
        .filter(|a| ctx.profile.weight(**a) > 0.0 && ctx.listing_vector.weight(**a) > 0.0)
        .copied()
        .collect();

    let message = match priority {
        NotificationPriority::Critical => format!(
            "Hot lead: buyer {} scored {} on listing {}. Call now.",
            ctx.buyer_id, ctx.score, ctx.listing_id
        ),
        NotificationPriority::High => format!(
            "New lead: buyer {} scored {} on listing {}.",
            ctx.buyer_id, ctx.score, ctx.listing_id
        ),
        NotificationPriority::Low => format!(
            "Saved listing: buyer {} saved listing {} (score {}).",
            ctx.buyer_id, ctx.listing_id, ctx.score
        ),
    };

    Notification {
        id: Uuid::new_v4(),
        priority,
        buyer_id: ctx.buyer_id.to_string(),
        listing_id: ctx.listing_id,
        match_score: ctx.score,
        matched_archetypes: matched,
        message,
        metadata: Some(serde_json::json!({
            "lead_id": lead.id,
            "action": ctx.action.as_str(),
        })),
        created_at: Utc::now(),
    }
}
