//! Scoring formula for recommendations

use super::types::ComponentScores;
use crate::behavior::BehaviorSnapshot;
use crate::domain::product::Product;

/// Weights for scoring components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Points per product view (default: 2.0)
    pub per_view: f64,
    /// Points per second of dwell time (default: 1.0)
    pub per_dwell_second: f64,
    /// Flat bonus when any search term matches (default: 5.0)
    pub search_match_bonus: f64,
    /// Points per rating star (default: 2.0)
    pub per_rating_point: f64,
    /// Multiplier on `ln(review_count + 1)` (default: 1.0)
    pub review_volume: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

/// Score calculator for recommendations
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
}

impl ScoreCalculator {
    /// Create a new score calculator with default weights
    pub fn new() -> Self {
        Self { weights: ScoringWeights::default() }
    }

    /// Calculate every weighted term for one product
    pub fn component_scores(&self, product: &Product, behavior: &BehaviorSnapshot) -> ComponentScores {
        let signal = behavior.signal(&product.id);

        ComponentScores {
            views: signal.view_count as f64 * self.weights.per_view,
            dwell: signal.dwell_millis as f64 / 1000.0 * self.weights.per_dwell_second,
            search_match: if self.matches_search(product, behavior) {
                self.weights.search_match_bonus
            } else {
                0.0
            },
            rating: product.rating * self.weights.per_rating_point,
            reviews: (f64::from(product.review_count) + 1.0).ln() * self.weights.review_volume,
        }
    }

    /// Any logged query contained in the product name, category or a tag
    pub fn matches_search(&self, product: &Product, behavior: &BehaviorSnapshot) -> bool {
        behavior.searches().iter().any(|query| product.mentions(query))
    }

    /// Generate human-readable reasoning
    pub fn generate_reasoning(&self, product: &Product, components: &ComponentScores) -> Vec<String> {
        let mut reasons = Vec::new();

        if components.views > 0.0 {
            reasons.push("You viewed this recently".to_string());
        }

        if components.dwell >= 1.0 {
            reasons.push("You spent time looking at this".to_string());
        }

        if components.search_match > 0.0 {
            reasons.push("Matches something you searched for".to_string());
        }

        if reasons.is_empty() {
            reasons.push(format!(
                "Popular pick: rated {:.1} from {} reviews",
                product.rating, product.review_count
            ));
        }

        reasons
    }
}

impl Default for ScoreCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::behavior::BehaviorStore;
    use crate::domain::product::ProductId;

    fn lens() -> Product {
        Product {
            id: ProductId::new("4"),
            name: "Professional Camera Lens".to_string(),
            description: String::new(),
            category: "Photography".to_string(),
            brand: "LensMaster".to_string(),
            price: Decimal::new(59999, 2),
            rating: 4.8,
            review_count: 89,
            tags: vec!["camera".to_string(), "lens".to_string()],
            in_stock: true,
        }
    }

    #[test]
    fn test_cold_start_components() {
        let calculator = ScoreCalculator::new();
        let components = calculator.component_scores(&lens(), &BehaviorStore::new().snapshot());

        assert!(components.is_cold_start());
        assert!((components.rating - 9.6).abs() < 1e-9);
        assert!((components.reviews - 90f64.ln()).abs() < 1e-9);
        assert!((components.total() - (9.6 + 90f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn test_all_signals_are_additive() {
        let calculator = ScoreCalculator::new();
        let mut store = BehaviorStore::new();
        store.record_view(&ProductId::new("4"));
        store.record_view(&ProductId::new("4"));
        store.record_dwell(&ProductId::new("4"), 2_500);
        store.record_search("PHOTO");

        let components = calculator.component_scores(&lens(), &store.snapshot());

        assert_eq!(components.views, 4.0);
        assert!((components.dwell - 2.5).abs() < 1e-9);
        assert_eq!(components.search_match, 5.0);
        let expected = 4.0 + 2.5 + 5.0 + 9.6 + 90f64.ln();
        assert!((components.total() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_search_bonus_is_flat_regardless_of_match_count() {
        let calculator = ScoreCalculator::new();
        let mut store = BehaviorStore::new();
        store.record_search("camera");
        store.record_search("lens");
        store.record_search("sofa");

        let components = calculator.component_scores(&lens(), &store.snapshot());
        assert_eq!(components.search_match, 5.0);
    }

    #[test]
    fn test_reasoning_falls_back_to_popularity() {
        let calculator = ScoreCalculator::new();
        let product = lens();
        let components = calculator.component_scores(&product, &BehaviorStore::new().snapshot());

        let reasons = calculator.generate_reasoning(&product, &components);
        assert_eq!(reasons, vec!["Popular pick: rated 4.8 from 89 reviews".to_string()]);
    }

    #[test]
    fn test_custom_weights() {
        let calculator = ScoreCalculator {
            weights: ScoringWeights { per_view: 10.0, ..ScoringWeights::default() },
        };
        let mut store = BehaviorStore::new();
        store.record_view(&ProductId::new("4"));

        let components = calculator.component_scores(&lens(), &store.snapshot());
        assert_eq!(components.views, 10.0);
        assert_eq!(calculator.weights.search_match_bonus, 5.0);
    }
}
