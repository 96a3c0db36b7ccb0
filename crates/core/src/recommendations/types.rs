//! Types for the recommendation scorer

use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// Individual, already-weighted score terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ComponentScores {
    /// Weighted view count
    pub views: f64,
    /// Weighted dwell time in seconds
    pub dwell: f64,
    /// Bonus when a recent search mentions the product
    pub search_match: f64,
    /// Weighted rating
    pub rating: f64,
    /// Weighted `ln(review_count + 1)`
    pub reviews: f64,
}

impl ComponentScores {
    pub fn total(&self) -> f64 {
        self.views + self.dwell + self.search_match + self.rating + self.reviews
    }

    /// True when no behavioral signal contributed, only catalog quality.
    pub fn is_cold_start(&self) -> bool {
        self.views == 0.0 && self.dwell == 0.0 && self.search_match == 0.0
    }
}

/// A catalog product with its score and the reasons behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: f64,
    pub components: ComponentScores,
    /// Human-readable reasoning
    pub reasoning: Vec<String>,
}
