pub mod config;
pub mod models;
pub mod services;

pub use config::EngineConfig;
pub use models::{
    Archetype, BuyerAction, BuyerEvent, Lead, ListingVector, Notification, NotificationPriority,
    SwipeOutcome,
};
pub use services::{DecisionPolicy, MatchEngine, MatchScorer, ProfileBuilder};
