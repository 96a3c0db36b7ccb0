//! Behavior-driven product recommendations
//!
//! Scores every catalog product from observed shopper signals plus the
//! product's own rating and review volume. Scores are additive and
//! unnormalized: they only mean something as a ranking.

mod engine;
mod scoring;
mod types;

pub use engine::RecommendationScorer;
pub use scoring::{ScoreCalculator, ScoringWeights};
pub use types::*;

/// Default scoring weights
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    per_view: 2.0,
    per_dwell_second: 1.0,
    search_match_bonus: 5.0,
    per_rating_point: 2.0,
    review_volume: 1.0,
};
