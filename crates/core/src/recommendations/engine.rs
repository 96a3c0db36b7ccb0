//! Recommendation scorer implementation

use super::scoring::ScoreCalculator;
use super::types::ScoredProduct;
use crate::behavior::BehaviorSnapshot;
use crate::catalog::Catalog;
use crate::domain::product::Product;

/// Ranks a catalog snapshot against a behavior snapshot
#[derive(Debug, Clone, Default)]
pub struct RecommendationScorer {
    calculator: ScoreCalculator,
}

impl RecommendationScorer {
    /// Create a new scorer with default weights
    pub fn new() -> Self {
        Self { calculator: ScoreCalculator::new() }
    }

    /// Score every catalog product, best first. Equal scores keep catalog order.
    pub fn score(&self, catalog: &Catalog, behavior: &BehaviorSnapshot) -> Vec<ScoredProduct> {
        let mut scored: Vec<ScoredProduct> = catalog
            .iter()
            .map(|product| {
                let components = self.calculator.component_scores(product, behavior);
                ScoredProduct {
                    product: product.clone(),
                    score: components.total(),
                    reasoning: self.calculator.generate_reasoning(product, &components),
                    components,
                }
            })
            .collect();

        // `sort_by` is stable, which is what keeps ties in catalog order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }

    /// Top `limit` products by score
    pub fn recommend(
        &self,
        catalog: &Catalog,
        behavior: &BehaviorSnapshot,
        limit: usize,
    ) -> Vec<Product> {
        self.score(catalog, behavior)
            .into_iter()
            .take(limit)
            .map(|scored| scored.product)
            .collect()
    }
}
