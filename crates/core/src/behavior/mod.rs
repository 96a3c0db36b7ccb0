//! Implicit shopper signals: views, dwell time, searches and purchases.
//!
//! The store is an explicitly owned value; whoever owns it decides its
//! lifetime. Scoring never reads the store directly, it reads a
//! [`BehaviorSnapshot`].

mod patterns;

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

pub use patterns::{analyze_patterns, ShoppingPatterns, SpendingRange, MAX_PATTERN_ENTRIES};

/// Most recent search queries kept for relevance scoring.
pub const SEARCH_LOG_CAPACITY: usize = 50;

/// Per-product counters. Both fields only ever grow within a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorSignal {
    pub view_count: u64,
    pub dwell_millis: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BehaviorEvent {
    View(ProductId),
    Dwell { product_id: ProductId, millis: i64 },
    Search(String),
    Purchase(ProductId),
}

#[derive(Clone, Debug, Default)]
pub struct BehaviorStore {
    signals: HashMap<ProductId, BehaviorSignal>,
    searches: VecDeque<String>,
    purchases: Vec<ProductId>,
}

impl BehaviorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one view. Identifiers are not checked against any catalog.
    pub fn record_view(&mut self, product_id: &ProductId) {
        let signal = self.signals.entry(product_id.clone()).or_default();
        signal.view_count = signal.view_count.saturating_add(1);
    }

    /// Adds dwell time. Negative durations are ignored; returns whether the
    /// value was applied.
    pub fn record_dwell(&mut self, product_id: &ProductId, millis: i64) -> bool {
        let Ok(millis) = u64::try_from(millis) else {
            return false;
        };
        let signal = self.signals.entry(product_id.clone()).or_default();
        signal.dwell_millis = signal.dwell_millis.saturating_add(millis);
        true
    }

    pub fn record_search(&mut self, query: &str) {
        self.searches.push_back(query.to_lowercase());
        while self.searches.len() > SEARCH_LOG_CAPACITY {
            self.searches.pop_front();
        }
    }

    pub fn record_purchase(&mut self, product_id: &ProductId) {
        self.purchases.push(product_id.clone());
    }

    /// Applies one event; `false` means the event carried nothing to record.
    pub fn apply(&mut self, event: &BehaviorEvent) -> bool {
        match event {
            BehaviorEvent::View(product_id) => {
                self.record_view(product_id);
                true
            }
            BehaviorEvent::Dwell { product_id, millis } => self.record_dwell(product_id, *millis),
            BehaviorEvent::Search(query) => {
                self.record_search(query);
                true
            }
            BehaviorEvent::Purchase(product_id) => {
                self.record_purchase(product_id);
                true
            }
        }
    }

    pub fn signal(&self, product_id: &ProductId) -> BehaviorSignal {
        self.signals.get(product_id).copied().unwrap_or_default()
    }

    pub fn searches(&self) -> impl Iterator<Item = &str> {
        self.searches.iter().map(String::as_str)
    }

    pub fn snapshot(&self) -> BehaviorSnapshot {
        BehaviorSnapshot {
            signals: self.signals.clone(),
            searches: self.searches.iter().cloned().collect(),
            purchases: self.purchases.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.signals.clear();
        self.searches.clear();
        self.purchases.clear();
    }
}

/// Immutable copy of every signal collection, taken at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BehaviorSnapshot {
    signals: HashMap<ProductId, BehaviorSignal>,
    searches: Vec<String>,
    purchases: Vec<ProductId>,
}

impl BehaviorSnapshot {
    pub fn signal(&self, product_id: &ProductId) -> BehaviorSignal {
        self.signals.get(product_id).copied().unwrap_or_default()
    }

    /// Lower-cased queries, oldest first.
    pub fn searches(&self) -> &[String] {
        &self.searches
    }

    pub fn purchase_count(&self, product_id: &ProductId) -> u64 {
        self.purchases.iter().filter(|id| *id == product_id).count() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty() && self.searches.is_empty() && self.purchases.is_empty()
    }
}
