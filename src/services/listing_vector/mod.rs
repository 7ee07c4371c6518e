// ============================================
// Listing Vector Deriver
// ============================================
//
// Converts classifier output for a listing into a weight vector over the
// archetype catalog. Three cases:
// 1. Ranked (archetype, score) breakdown -> vector, entries clamped to [0,1]
// 2. Single non-Unclassified tag -> one-hot vector
// 3. No signal (nothing, or Unclassified only) -> no vector at all
//
// "No vector" is None, never an all-zero vector: callers must treat it as
// "cannot be scored on the vibe axis" and fall back to other signals.

use crate::models::{Archetype, ListingVector};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ListingVectorError {
    #[error("listing weight {weight} for {archetype} is outside [0,1]")]
    WeightOutOfRange { archetype: Archetype, weight: f64 },

    #[error("Unclassified cannot be a vector dimension")]
    UnclassifiedDimension,
}

/// One entry of a classifier's multi-archetype breakdown ("top vibes").
#[derive(Debug, Clone)]
pub struct VibeBreakdownEntry {
    pub archetype: Archetype,
    pub score: f64,
}

/// Classifier output for a listing, as persisted by the listing store.
#[derive(Debug, Clone, Default)]
pub struct ClassifierOutput {
    pub tag: Option<Archetype>,
    pub breakdown: Vec<VibeBreakdownEntry>,
}

/// Derive a listing's archetype vector from classifier output.
///
/// Pure function of its input. Returns `None` when the listing carries no
/// archetype signal at all.
pub fn derive_listing_vector(output: &ClassifierOutput) -> Option<ListingVector> {
    if !output.breakdown.is_empty() {
        let mut weights: HashMap<Archetype, f64> = HashMap::new();
        for entry in &output.breakdown {
            if entry.archetype.is_unclassified() || !entry.score.is_finite() {
                debug!(
                    archetype = %entry.archetype,
                    score = entry.score,
                    "Dropping unusable breakdown entry"
                );
                continue;
            }
            let clamped = entry.score.clamp(0.0, 1.0);
            // A duplicated archetype keeps its strongest signal.
            let slot = weights.entry(entry.archetype).or_insert(0.0);
            if clamped > *slot {
                *slot = clamped;
            }
        }
        if !weights.is_empty() {
            return Some(ListingVector::from_clamped(weights));
        }
    }

    match output.tag {
        Some(tag) if !tag.is_unclassified() => Some(ListingVector::one_hot(tag)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_takes_precedence_over_tag() {
        let output = ClassifierOutput {
            tag: Some(Archetype::Nomad),
            breakdown: vec![
                VibeBreakdownEntry {
                    archetype: Archetype::Purist,
                    score: 0.9,
                },
                VibeBreakdownEntry {
                    archetype: Archetype::Naturalist,
                    score: 0.4,
                },
            ],
        };

        let vector = derive_listing_vector(&output).unwrap();
        assert_eq!(vector.weight(Archetype::Purist), 0.9);
        assert_eq!(vector.weight(Archetype::Naturalist), 0.4);
        assert_eq!(vector.weight(Archetype::Nomad), 0.0);
    }

    #[test]
    fn breakdown_scores_are_clamped() {
        let output = ClassifierOutput {
            tag: None,
            breakdown: vec![
                VibeBreakdownEntry {
                    archetype: Archetype::Monarch,
                    score: 1.7,
                },
                VibeBreakdownEntry {
                    archetype: Archetype::Curator,
                    score: -0.3,
                },
            ],
        };

        let vector = derive_listing_vector(&output).unwrap();
        assert_eq!(vector.weight(Archetype::Monarch), 1.0);
        assert_eq!(vector.weight(Archetype::Curator), 0.0);
    }

    #[test]
    fn nan_entries_are_dropped_not_propagated() {
        let output = ClassifierOutput {
            tag: None,
            breakdown: vec![VibeBreakdownEntry {
                archetype: Archetype::Futurist,
                score: f64::NAN,
            }],
        };

        assert!(derive_listing_vector(&output).is_none());
    }

    #[test]
    fn single_tag_becomes_one_hot() {
        let output = ClassifierOutput {
            tag: Some(Archetype::Naturalist),
            breakdown: vec![],
        };

        let vector = derive_listing_vector(&output).unwrap();
        assert_eq!(vector.weight(Archetype::Naturalist), 1.0);
        assert_eq!(vector.top_archetypes(3), vec![Archetype::Naturalist]);
    }

    #[test]
    fn unclassified_listing_has_no_vector() {
        let output = ClassifierOutput {
            tag: Some(Archetype::Unclassified),
            breakdown: vec![],
        };
        assert!(derive_listing_vector(&output).is_none());

        assert!(derive_listing_vector(&ClassifierOutput::default()).is_none());
    }

    #[test]
    fn unclassified_breakdown_entries_fall_back_to_tag() {
        let output = ClassifierOutput {
            tag: Some(Archetype::Classicist),
            breakdown: vec![VibeBreakdownEntry {
                archetype: Archetype::Unclassified,
                score: 0.8,
            }],
        };

        let vector = derive_listing_vector(&output).unwrap();
        assert_eq!(vector.weight(Archetype::Classicist), 1.0);
    }
}
