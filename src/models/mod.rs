use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Style archetype ("vibe") catalog.
///
/// The eight real archetypes plus the `Unclassified` sentinel. `Unclassified`
/// marks "no signal" from the classifier; it is never a vector dimension and
/// never accumulates profile weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Archetype {
    Monarch,
    Industrialist,
    Purist,
    Naturalist,
    Futurist,
    Curator,
    Nomad,
    Classicist,
    Unclassified,
}

impl Archetype {
    /// The real archetypes in canonical catalog order. This order is the
    /// tie-break for top-N rankings, so it must stay stable.
    pub const ALL: [Archetype; 8] = [
        Archetype::Monarch,
        Archetype::Industrialist,
        Archetype::Purist,
        Archetype::Naturalist,
        Archetype::Futurist,
        Archetype::Curator,
        Archetype::Nomad,
        Archetype::Classicist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Monarch => "monarch",
            Archetype::Industrialist => "industrialist",
            Archetype::Purist => "purist",
            Archetype::Naturalist => "naturalist",
            Archetype::Futurist => "futurist",
            Archetype::Curator => "curator",
            Archetype::Nomad => "nomad",
            Archetype::Classicist => "classicist",
            Archetype::Unclassified => "unclassified",
        }
    }

    /// Parse a classifier tag. Unknown strings map to `Unclassified` rather
    /// than being compared ad hoc downstream, so a typo'd tag can never pose
    /// as a valid zero-weight archetype.
    pub fn parse_tag(tag: &str) -> Archetype {
        match tag.trim().to_ascii_lowercase().as_str() {
            "monarch" => Archetype::Monarch,
            "industrialist" => Archetype::Industrialist,
            "purist" => Archetype::Purist,
            "naturalist" => Archetype::Naturalist,
            "futurist" => Archetype::Futurist,
            "curator" => Archetype::Curator,
            "nomad" => Archetype::Nomad,
            "classicist" => Archetype::Classicist,
            _ => Archetype::Unclassified,
        }
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self, Archetype::Unclassified)
    }

    /// Short design-language blurb for each vibe, used in agent-facing copy.
    pub fn style_blurb(&self) -> &'static str {
        match self {
            Archetype::Monarch => "modern luxury opulence in black, gold and emerald green",
            Archetype::Industrialist => "raw urban loft with charcoal, rust and exposed brick",
            Archetype::Purist => "japanese-scandinavian minimalism in warm white and light oak",
            Archetype::Naturalist => "biophilic sanctuary of sage green, terracotta and raw wood",
            Archetype::Futurist => "high-tech lines in neon blue, cool white and chrome",
            Archetype::Curator => "eclectic maximalism with gallery walls and bold color",
            Archetype::Nomad => "global boho layers of ochre, sand and reclaimed wood",
            Archetype::Classicist => "traditional heritage in navy, cream and mahogany",
            Archetype::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consumer swipe action on a listing card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BuyerAction {
    Like,
    Nope,
    Save,
    Skip,
}

impl BuyerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuyerAction::Like => "like",
            BuyerAction::Nope => "nope",
            BuyerAction::Save => "save",
            BuyerAction::Skip => "skip",
        }
    }
}

/// One immutable buyer interaction record. Append-only; validated at the
/// ingestion boundary (see `InMemoryEventLog::append`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerEvent {
    pub buyer_id: String,
    pub listing_id: Uuid,
    pub action: BuyerAction,
    /// Dwell time on the card in milliseconds, capped at ingestion.
    pub dwell_ms: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Per-listing weights across the archetype catalog.
///
/// Weights are in [0,1] and need not sum to 1. Absent archetypes have weight
/// zero. A listing with no classifier signal has *no* vector (`Option::None`
/// at the call sites), which is distinct from an all-zero vector.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingVector {
    weights: HashMap<Archetype, f64>,
}

impl ListingVector {
    /// Build from pre-validated weights. Returns an error if any weight is
    /// outside [0,1] or non-finite, or if `Unclassified` appears as a
    /// dimension; those are contract violations, not degradable states.
    pub fn new(
        weights: HashMap<Archetype, f64>,
    ) -> Result<Self, crate::services::listing_vector::ListingVectorError> {
        use crate::services::listing_vector::ListingVectorError;
        for (archetype, weight) in &weights {
            if archetype.is_unclassified() {
                return Err(ListingVectorError::UnclassifiedDimension);
            }
            if !weight.is_finite() || *weight < 0.0 || *weight > 1.0 {
                return Err(ListingVectorError::WeightOutOfRange {
                    archetype: *archetype,
                    weight: *weight,
                });
            }
        }
        Ok(Self { weights })
    }

    /// One-hot vector: weight 1.0 on a single archetype.
    pub fn one_hot(archetype: Archetype) -> Self {
        let mut weights = HashMap::new();
        if !archetype.is_unclassified() {
            weights.insert(archetype, 1.0);
        }
        Self { weights }
    }

    pub(crate) fn from_clamped(weights: HashMap<Archetype, f64>) -> Self {
        Self { weights }
    }

    pub fn weight(&self, archetype: Archetype) -> f64 {
        self.weights.get(&archetype).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Archetype, f64)> + '_ {
        self.weights.iter().map(|(a, w)| (*a, *w))
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Archetypes by weight descending, ties broken by catalog order.
    pub fn top_archetypes(&self, n: usize) -> Vec<Archetype> {
        let mut ranked: Vec<(Archetype, f64)> = Archetype::ALL
            .iter()
            .filter_map(|a| {
                let w = self.weight(*a);
                (w > 0.0).then_some((*a, w))
            })
            .collect();
        // Catalog order is already the iteration order, so a stable sort on
        // weight alone preserves the deterministic tie-break.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.into_iter().take(n).map(|(a, _)| a).collect()
    }
}

/// Notification priority tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationPriority {
    /// Batched delivery, can wait (save-bypass leads below the score bar).
    Low,
    /// Immediate delivery (qualified lead).
    High,
    /// Interrupt the agent (hot lead).
    Critical,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::High => "high",
            NotificationPriority::Critical => "critical",
        }
    }
}

/// Sales lead created when a swipe clears the decision policy.
///
/// At most one lead exists per (buyer, listing) pair; the vectors are
/// snapshots taken at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub buyer_id: String,
    pub listing_id: Uuid,
    pub match_score: u8,
    pub hot: bool,
    pub buyer_vector: HashMap<Archetype, f64>,
    pub listing_vector: ListingVector,
    pub buyer_top_archetypes: Vec<Archetype>,
    pub listing_top_archetypes: Vec<Archetype>,
    /// Canned pitch keyed by the buyer's dominant archetype.
    pub talk_track: String,
    /// Archetype-specific pitches and changes to steer clear of.
    pub avoid_list: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Agent-facing notification emitted alongside lead creation. Carries enough
/// context that a human can act without re-querying the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub priority: NotificationPriority,
    pub buyer_id: String,
    pub listing_id: Uuid,
    pub match_score: u8,
    pub matched_archetypes: Vec<Archetype>,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Optional hard criteria used for deterministic score bonuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyerCriteria {
    pub max_budget: Option<u64>,
    pub desired_bedrooms: Option<u8>,
    pub must_have_tags: Vec<String>,
}

/// Listing facts consulted by the bonus rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingFacts {
    pub price: Option<u64>,
    pub bedrooms: Option<u8>,
    pub tags: Vec<String>,
}

/// Result of evaluating one swipe end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeOutcome {
    pub match_score: u8,
    pub buyer_top_archetypes: Vec<Archetype>,
    pub listing_top_archetypes: Vec<Archetype>,
    pub lead_created: bool,
    pub hot_lead: bool,
    pub lead: Option<Lead>,
    pub notification: Option<Notification>,
}
