use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BehaviorSnapshot;
use crate::catalog::Catalog;

/// How many categories / brands a pattern summary lists.
pub const MAX_PATTERN_ENTRIES: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl fmt::Display for SpendingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}-${}", self.min, self.max)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingPatterns {
    pub favorite_categories: Vec<String>,
    pub preferred_brands: Vec<String>,
    pub spending_range: Option<SpendingRange>,
}

/// Summarizes which catalog products the shopper engaged with.
///
/// Engagement per product is views plus purchases. Categories and brands are
/// ranked by total engagement, ties keeping catalog order. The spending range
/// spans the engaged products' prices, widened to whole dollars.
pub fn analyze_patterns(snapshot: &BehaviorSnapshot, catalog: &Catalog) -> ShoppingPatterns {
    let engaged: Vec<_> = catalog
        .iter()
        .map(|product| {
            let weight = snapshot.signal(&product.id).view_count
                + snapshot.purchase_count(&product.id);
            (product, weight)
        })
        .filter(|(_, weight)| *weight > 0)
        .collect();

    let favorite_categories =
        top_entries(engaged.iter().map(|(product, weight)| (product.category.as_str(), *weight)));
    let preferred_brands =
        top_entries(engaged.iter().map(|(product, weight)| (product.brand.as_str(), *weight)));

    let spending_range = engaged.iter().map(|(product, _)| product.price).fold(
        None,
        |range: Option<(Decimal, Decimal)>, price| match range {
            Some((min, max)) => Some((min.min(price), max.max(price))),
            None => Some((price, price)),
        },
    );

    ShoppingPatterns {
        favorite_categories,
        preferred_brands,
        spending_range: spending_range
            .map(|(min, max)| SpendingRange { min: min.floor(), max: max.ceil() }),
    }
}

fn top_entries<'a>(entries: impl Iterator<Item = (&'a str, u64)>) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for (name, weight) in entries {
        let total = totals.entry(name).or_insert_with(|| {
            order.push(name);
            0
        });
        *total += weight;
    }

    let mut ranked: Vec<(&str, u64)> =
        order.into_iter().map(|name| (name, totals.get(name).copied().unwrap_or(0))).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(MAX_PATTERN_ENTRIES).map(|(name, _)| name.to_owned()).collect()
}
