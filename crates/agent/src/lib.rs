//! Shopping assistant runtime.
//!
//! This crate turns shopper input into replies and behavior signals:
//! - Routes chat messages to one of a fixed set of intents (`intent`)
//! - Rejects empty input, and input over an optional length cap (`guardrails`)
//! - Keeps the conversation and mirrors it to the key-value store (`history`)
//! - Exposes the whole engine behind one facade (`runtime`)
//!
//! # Flow of a chat message
//!
//! 1. **Guard** - `InputGuard` validates the raw text
//! 2. **Classify** - ordered keyword rules pick an `Intent`
//! 3. **Respond** - a pure function renders the reply from catalog, behavior and cart snapshots
//! 4. **Record** - search intents feed the behavior store, the exchange is persisted
//!
//! Routing is deterministic keyword matching. There is no language model in the loop.

pub mod guardrails;
pub mod history;
pub mod intent;
pub mod runtime;

pub use intent::{classify, Intent, IntentKind, IntentRouter, RouteContext, RoutedReply};
pub use runtime::{ChatTurn, Collaborators, PersistenceOutcome, ShoppingAssistant, TrackEvent};
