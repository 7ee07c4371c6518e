pub mod decision;
pub mod engine;
pub mod event_log;
pub mod listing_vector;
pub mod profile_builder;
pub mod scoring;
pub mod session_taste;

pub use decision::DecisionPolicy;
pub use engine::MatchEngine;
pub use listing_vector::derive_listing_vector;
pub use profile_builder::ProfileBuilder;
pub use scoring::MatchScorer;
