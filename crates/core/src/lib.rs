pub mod behavior;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recognition;
pub mod recommendations;

pub use behavior::{
    analyze_patterns, BehaviorEvent, BehaviorSignal, BehaviorSnapshot, BehaviorStore,
    ShoppingPatterns, SpendingRange,
};
pub use catalog::{Catalog, CatalogProvider};
pub use domain::cart::{CartLine, CartProvider, CartSnapshot, StaticCart};
pub use domain::message::{Conversation, Message, MessageId, Role};
pub use domain::product::{Product, ProductId};
pub use domain::scan::{BoundingBox, ScanResult};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recognition::{MockRecognizer, RecognitionProvider};
pub use recommendations::{RecommendationScorer, ScoredProduct, ScoringWeights};
