use crate::models::BuyerAction;
use serde::Deserialize;
use std::env;

fn parse_action_list(raw: &str, var: &str) -> Vec<BuyerAction> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "like" => BuyerAction::Like,
            "nope" => BuyerAction::Nope,
            "save" => BuyerAction::Save,
            "skip" => BuyerAction::Skip,
            other => panic!("{var} contains unknown action '{other}'"),
        })
        .collect()
}

/// Engine configuration. Every tunable ships with a sensible default so the
/// library can be embedded without any environment, while deployments override
/// through env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub weights: ActionWeights,
    pub policy: PolicyConfig,
    pub scoring: ScoringConfig,
    pub session: SessionConfig,
}

/// Per-action accumulation weights for the profile fold.
///
/// `nope` must never increase affinity; it is tallied separately as a
/// negative signal rather than subtracting from the additive vector.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionWeights {
    pub save: f64,
    pub like: f64,
    pub skip: f64,
    pub nope: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Minimum score for a positive swipe to create a lead.
    pub lead_threshold: u8,
    /// Score at which a lead is marked hot (critical alerting).
    pub hot_threshold: u8,
    /// Actions that count as positive intent and can create a lead when the
    /// score clears the lead threshold.
    pub positive_actions: Vec<BuyerAction>,
    /// Actions that bypass the score threshold entirely (explicit intent
    /// outweighs implicit scoring). Empty disables the bypass.
    pub bypass_actions: Vec<BuyerAction>,
    /// How many top archetypes to carry on leads and outcomes.
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Dot product value that maps to a score of 100. Defaults to the save
    /// weight so one full-intent save on a perfectly matching listing maxes
    /// the scale.
    pub saturation: f64,
    /// Additive bonus for a listing at or under the buyer's budget.
    pub budget_bonus: u8,
    /// Additive bonus for an exact bedroom-count match.
    pub bedroom_bonus: u8,
    /// Additive bonus per matched must-have tag.
    pub must_have_bonus: u8,
    /// Cap on the summed must-have bonuses.
    pub must_have_bonus_cap: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// TTL for anonymous session taste counters, in seconds.
    pub taste_ttl_seconds: u64,
}

impl Default for ActionWeights {
    fn default() -> Self {
        Self {
            save: 3.0,
            like: 1.0,
            skip: 0.0,
            nope: 0.0,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            lead_threshold: 85,
            hot_threshold: 95,
            positive_actions: vec![BuyerAction::Like, BuyerAction::Save],
            bypass_actions: vec![BuyerAction::Save],
            top_n: 3,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            saturation: 3.0,
            budget_bonus: 5,
            bedroom_bonus: 3,
            must_have_bonus: 2,
            must_have_bonus_cap: 6,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            taste_ttl_seconds: 7200, // 2 hours
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ActionWeights::default(),
            policy: PolicyConfig::default(),
            scoring: ScoringConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenv::dotenv().ok();

        Ok(EngineConfig {
            weights: ActionWeights {
                save: env::var("WEIGHT_SAVE")
                    .unwrap_or_else(|_| "3.0".to_string())
                    .parse()
                    .expect("WEIGHT_SAVE must be a valid f64"),
                like: env::var("WEIGHT_LIKE")
                    .unwrap_or_else(|_| "1.0".to_string())
                    .parse()
                    .expect("WEIGHT_LIKE must be a valid f64"),
                skip: env::var("WEIGHT_SKIP")
                    .unwrap_or_else(|_| "0.0".to_string())
                    .parse()
                    .expect("WEIGHT_SKIP must be a valid f64"),
                nope: env::var("WEIGHT_NOPE")
                    .unwrap_or_else(|_| "0.0".to_string())
                    .parse()
                    .expect("WEIGHT_NOPE must be a valid f64"),
            },
            policy: PolicyConfig {
                lead_threshold: env::var("LEAD_THRESHOLD")
                    .unwrap_or_else(|_| "85".to_string())
                    .parse()
                    .expect("LEAD_THRESHOLD must be a valid u8"),
                hot_threshold: env::var("HOT_THRESHOLD")
                    .unwrap_or_else(|_| "95".to_string())
                    .parse()
                    .expect("HOT_THRESHOLD must be a valid u8"),
                positive_actions: parse_action_list(
                    &env::var("POSITIVE_ACTIONS").unwrap_or_else(|_| "like,save".to_string()),
                    "POSITIVE_ACTIONS",
                ),
                bypass_actions: parse_action_list(
                    &env::var("BYPASS_ACTIONS").unwrap_or_else(|_| "save".to_string()),
                    "BYPASS_ACTIONS",
                ),
                top_n: env::var("TOP_N_ARCHETYPES")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .expect("TOP_N_ARCHETYPES must be a valid usize"),
            },
            scoring: ScoringConfig {
                saturation: env::var("SCORE_SATURATION")
                    .unwrap_or_else(|_| "3.0".to_string())
                    .parse()
                    .expect("SCORE_SATURATION must be a valid f64"),
                budget_bonus: env::var("BUDGET_BONUS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("BUDGET_BONUS must be a valid u8"),
                bedroom_bonus: env::var("BEDROOM_BONUS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .expect("BEDROOM_BONUS must be a valid u8"),
                must_have_bonus: env::var("MUST_HAVE_BONUS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .expect("MUST_HAVE_BONUS must be a valid u8"),
                must_have_bonus_cap: env::var("MUST_HAVE_BONUS_CAP")
                    .unwrap_or_else(|_| "6".to_string())
                    .parse()
                    .expect("MUST_HAVE_BONUS_CAP must be a valid u8"),
            },
            session: SessionConfig {
                taste_ttl_seconds: env::var("TASTE_TTL_SECONDS")
                    .unwrap_or_else(|_| "7200".to_string())
                    .parse()
                    .expect("TASTE_TTL_SECONDS must be a valid u64"),
            },
        })
    }
}
