use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use shopsense_core::behavior::{analyze_patterns, BehaviorEvent, BehaviorStore, ShoppingPatterns};
use shopsense_core::catalog::{Catalog, CatalogProvider};
use shopsense_core::config::AssistantConfig;
use shopsense_core::domain::cart::{CartProvider, CartSnapshot};
use shopsense_core::domain::message::{Message, Role};
use shopsense_core::domain::product::{Product, ProductId};
use shopsense_core::domain::scan::ScanResult;
use shopsense_core::errors::ApplicationError;
use shopsense_core::recognition::RecognitionProvider;
use shopsense_core::recommendations::{RecommendationScorer, ScoredProduct};
use shopsense_db::repositories::ConversationRepository;

use crate::guardrails::{GuardrailDecision, InputGuard};
use crate::history::ConversationLog;
use crate::intent::{Intent, IntentKind, IntentRouter, RouteContext};

/// Interaction signals reported by the shopping UI.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackEvent {
    View(ProductId),
    Dwell { product_id: ProductId, millis: i64 },
    Search(String),
    Purchase(ProductId),
    Scan(ScanResult),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum PersistenceOutcome {
    Persisted,
    /// The write failed. History stays in memory and is not retried
    /// until the next send, `flush` or `clear`.
    Failed(String),
}

impl PersistenceOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatTurn {
    pub intent: IntentKind,
    pub user: Message,
    pub reply: Message,
    pub persistence: PersistenceOutcome,
}

pub struct Collaborators {
    pub catalog: Arc<dyn CatalogProvider>,
    pub cart: Arc<dyn CartProvider>,
    pub recognizer: Arc<dyn RecognitionProvider>,
    pub history: ConversationRepository,
}

/// Single entry point for shells: tracking, recommendations, chat and scans
/// for one shopper.
pub struct ShoppingAssistant {
    settings: AssistantConfig,
    catalog: Arc<dyn CatalogProvider>,
    cart: Arc<dyn CartProvider>,
    recognizer: Arc<dyn RecognitionProvider>,
    behavior: BehaviorStore,
    scorer: RecommendationScorer,
    router: IntentRouter,
    guard: InputGuard,
    history: ConversationLog,
}

impl ShoppingAssistant {
    pub async fn open(collaborators: Collaborators, settings: AssistantConfig) -> Self {
        let history = ConversationLog::load(collaborators.history).await;
        let scorer = RecommendationScorer::new();

        info!(
            event_name = "assistant.opened",
            restored_messages = history.len(),
            "shopping assistant ready"
        );

        Self {
            router: IntentRouter::new(scorer.clone(), settings.chat_recommendation_count),
            guard: InputGuard::new(settings.max_message_chars),
            settings,
            catalog: collaborators.catalog,
            cart: collaborators.cart,
            recognizer: collaborators.recognizer,
            behavior: BehaviorStore::new(),
            scorer,
            history,
        }
    }

    /// Replaces the behavior store, e.g. with one carried over from an earlier session.
    pub fn with_behavior(mut self, behavior: BehaviorStore) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn behavior(&self) -> &BehaviorStore {
        &self.behavior
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog.snapshot()
    }

    /// Returns whether the event changed any behavior signal.
    pub fn track(&mut self, event: TrackEvent) -> bool {
        let behavior_event = match event {
            TrackEvent::View(product_id) => BehaviorEvent::View(product_id),
            TrackEvent::Dwell { product_id, millis } => BehaviorEvent::Dwell { product_id, millis },
            TrackEvent::Search(query) => BehaviorEvent::Search(query),
            TrackEvent::Purchase(product_id) => BehaviorEvent::Purchase(product_id),
            TrackEvent::Scan(result) => {
                match result.confident_product(self.settings.scan_confidence_threshold) {
                    Some(product_id) => BehaviorEvent::View(product_id.clone()),
                    None => {
                        debug!(
                            event_name = "behavior.scan.ignored",
                            confidence = result.confidence,
                            "scan result below threshold or without product"
                        );
                        return false;
                    }
                }
            }
        };

        let recorded = self.behavior.apply(&behavior_event);
        if !recorded {
            debug!(
                event_name = "behavior.dwell.ignored",
                event = ?behavior_event,
                "negative dwell duration ignored"
            );
        }
        recorded
    }

    pub fn recommend(&self, limit: usize) -> Vec<Product> {
        self.scorer.recommend(&self.catalog.snapshot(), &self.behavior.snapshot(), limit)
    }

    pub fn recommend_default(&self) -> Vec<Product> {
        self.recommend(self.settings.default_recommendation_limit)
    }

    /// Scored ranking with per-component breakdown, best first.
    pub fn explain_recommendations(&self, limit: usize) -> Vec<ScoredProduct> {
        let mut scored = self.scorer.score(&self.catalog.snapshot(), &self.behavior.snapshot());
        scored.truncate(limit);
        scored
    }

    pub async fn send(&mut self, text: &str) -> Result<ChatTurn, ApplicationError> {
        let decision = self.guard.evaluate(text);
        if let GuardrailDecision::Deny { reason_code, .. } = &decision {
            info!(
                event_name = "assistant.message.rejected",
                reason_code = *reason_code,
                "input guard denied message"
            );
        }
        decision.into_result()?;

        let now = Utc::now().naive_utc();
        let user = self.history.append(Role::User, text, now);

        let intent = self.router.classify(text);
        let cart = match intent {
            Intent::Cart => Some(self.cart_snapshot().await),
            _ => None,
        };

        let catalog = self.catalog.snapshot();
        let behavior = self.behavior.snapshot();
        let context = RouteContext { catalog: &catalog, behavior: &behavior, cart: cart.as_ref() };
        let routed = self.router.respond(intent, &context);

        if let Some(query) = &routed.search_to_record {
            self.behavior.record_search(query);
        }

        let reply = self.history.append(Role::Assistant, &routed.reply, Utc::now().naive_utc());
        let persistence = self.persist_history().await;

        let intent = routed.intent.kind();
        info!(
            event_name = "assistant.message.routed",
            intent = intent.as_str(),
            persisted = persistence.is_persisted(),
            "chat message answered"
        );

        Ok(ChatTurn { intent, user, reply, persistence })
    }

    pub fn history(&self) -> &[Message] {
        self.history.messages()
    }

    /// Empties the history in memory, then writes the empty state.
    pub async fn clear(&mut self) -> Result<(), ApplicationError> {
        self.history.clear().await.map_err(|error| {
            warn!(
                event_name = "assistant.history.clear_failed",
                error = %error,
                "history cleared in memory but not in the store"
            );
            ApplicationError::from(error)
        })?;
        info!(event_name = "assistant.history.cleared", "conversation history cleared");
        Ok(())
    }

    /// Writes the in-memory history again, e.g. after a failed send.
    pub async fn flush(&mut self) -> Result<(), ApplicationError> {
        match self.persist_history().await {
            PersistenceOutcome::Persisted => Ok(()),
            PersistenceOutcome::Failed(message) => Err(ApplicationError::Persistence(message)),
        }
    }

    pub fn shopping_patterns(&self) -> ShoppingPatterns {
        analyze_patterns(&self.behavior.snapshot(), &self.catalog.snapshot())
    }

    /// Runs recognition on one camera frame and tracks a confident match as a view.
    pub async fn scan(&mut self, image: &[u8]) -> Result<Option<ScanResult>, ApplicationError> {
        let result = self.recognizer.recognize(image).await?;
        match &result {
            Some(scan) => {
                let tracked = self.track(TrackEvent::Scan(scan.clone()));
                info!(
                    event_name = "assistant.scan.completed",
                    product_id = scan.product_id.as_ref().map(ProductId::as_str),
                    confidence = scan.confidence,
                    tracked,
                    "product recognized"
                );
            }
            None => {
                info!(event_name = "assistant.scan.no_match", "no product recognized");
            }
        }
        Ok(result)
    }

    async fn cart_snapshot(&self) -> CartSnapshot {
        match self.cart.cart_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(
                    event_name = "assistant.cart.unavailable",
                    error = %error,
                    "cart could not be read; answering with an empty cart"
                );
                CartSnapshot::default()
            }
        }
    }

    async fn persist_history(&self) -> PersistenceOutcome {
        match self.history.persist().await {
            Ok(()) => PersistenceOutcome::Persisted,
            Err(error) => {
                warn!(
                    event_name = "assistant.history.persist_failed",
                    error = %error,
                    messages = self.history.len(),
                    "conversation history could not be written"
                );
                PersistenceOutcome::Failed(error.to_string())
            }
        }
    }
}
