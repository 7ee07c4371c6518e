// ============================================
// Match Scorer
// ============================================
//
// Compatibility between a buyer profile and a listing vector, as an integer
// in [0,100].
//
// score = clamp(round(100 * dot / saturation), 0, 100)
//   dot  = SUM over archetypes of profile[a] * listing[a]
//
// The rescale is monotone in the dot product. Saturation defaults to the
// save weight, so a single full-intent save on a perfectly matching listing
// maxes the scale, and a cold-start (all-zero) profile scores 0 rather than
// erroring. Deterministic bonuses (budget, bedrooms, must-have tags) layer
// on top, each capped so no bonus alone can push a non-match over the hot
// threshold.

use crate::config::ScoringConfig;
use crate::models::{Archetype, BuyerCriteria, ListingFacts, ListingVector};
use crate::services::profile_builder::{BuyerProfile, TasteProfile};
use tracing::debug;

pub struct MatchScorer {
    config: ScoringConfig,
}

impl MatchScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Archetype-axis score for a buyer profile against a listing vector.
    ///
    /// Callers hold the "no vector" case: this function is only invoked when
    /// the listing actually has a vector.
    pub fn score(&self, profile: &BuyerProfile, listing: &ListingVector) -> u8 {
        let mut dot = 0.0f64;
        for (archetype, listing_weight) in listing.iter() {
            let buyer_weight = profile.weight(archetype);
            // Out-of-range inputs stop at this boundary.
            if !buyer_weight.is_finite() || buyer_weight <= 0.0 {
                continue;
            }
            if !listing_weight.is_finite() || listing_weight <= 0.0 {
                continue;
            }
            dot += buyer_weight * listing_weight.min(1.0);
        }

        let score = rescale(dot, self.config.saturation);

        debug!(dot, score, "Scored buyer profile against listing vector");

        score
    }

    /// Legacy count-profile path: share of right-swipes that landed on the
    /// listing's tag. 0 for `Unclassified` or uncounted tags.
    pub fn legacy_score(&self, taste: &TasteProfile, tag: Archetype) -> u8 {
        if tag.is_unclassified() || taste.total_swipes() == 0 {
            return 0;
        }
        let ratio = f64::from(taste.count(tag)) / f64::from(taste.total_swipes());
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// Deterministic additive bonuses from hard criteria. Independent of the
    /// archetype axis; the must-have component carries its own cap.
    pub fn bonus(&self, criteria: &BuyerCriteria, facts: &ListingFacts) -> u8 {
        let mut bonus = 0u16;

        if let (Some(budget), Some(price)) = (criteria.max_budget, facts.price) {
            if price <= budget {
                bonus += u16::from(self.config.budget_bonus);
            }
        }

        if let (Some(wanted), Some(actual)) = (criteria.desired_bedrooms, facts.bedrooms) {
            if wanted == actual {
                bonus += u16::from(self.config.bedroom_bonus);
            }
        }

        let mut tag_bonus = 0u16;
        for tag in &criteria.must_have_tags {
            if facts.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                tag_bonus += u16::from(self.config.must_have_bonus);
            }
        }
        bonus += tag_bonus.min(u16::from(self.config.must_have_bonus_cap));

        bonus.min(100) as u8
    }

    /// Archetype score plus bonuses, clamped to [0,100].
    pub fn score_with_bonus(
        &self,
        profile: &BuyerProfile,
        listing: &ListingVector,
        criteria: &BuyerCriteria,
        facts: &ListingFacts,
    ) -> u8 {
        let base = u16::from(self.score(profile, listing));
        let total = base + u16::from(self.bonus(criteria, facts));
        total.min(100) as u8
    }
}

fn rescale(dot: f64, saturation: f64) -> u8 {
    if !dot.is_finite() || dot <= 0.0 || saturation <= 0.0 {
        return 0;
    }
    (dot / saturation * 100.0).round().clamp(0.0, 100.0) as u8
}
