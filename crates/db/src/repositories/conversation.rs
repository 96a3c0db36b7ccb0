use std::sync::Arc;

use tracing::warn;

use shopsense_core::domain::message::{Conversation, Message};

use super::{KeyValueStore, RepositoryError};

/// Reads and writes the whole conversation as one JSON array under `key`.
#[derive(Clone)]
pub struct ConversationRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl ConversationRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Missing or unreadable blobs load as an empty conversation; only
    /// store failures are errors.
    pub async fn load(&self) -> Result<Conversation, RepositoryError> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(Conversation::new());
        };

        match decode_history(&raw) {
            Ok(messages) => Ok(Conversation::from_messages(messages)),
            Err(error) => {
                warn!(
                    event_name = "history.load.discarded",
                    key = %self.key,
                    error = %error,
                    "stored conversation could not be parsed; starting empty"
                );
                Ok(Conversation::new())
            }
        }
    }

    pub async fn save(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        let encoded = encode_history(conversation.messages())?;
        self.store.set(&self.key, &encoded).await
    }
}

pub fn encode_history(messages: &[Message]) -> Result<String, RepositoryError> {
    serde_json::to_string(messages).map_err(|e| RepositoryError::Encode(e.to_string()))
}

pub fn decode_history(raw: &str) -> Result<Vec<Message>, RepositoryError> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use shopsense_core::domain::message::{Conversation, Role};

    use super::{decode_history, ConversationRepository};
    use crate::repositories::{InMemoryKeyValueStore, KeyValueStore, RepositoryError};

    fn repository() -> (Arc<InMemoryKeyValueStore>, ConversationRepository) {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let repo = ConversationRepository::new(store.clone(), "ai_messages");
        (store, repo)
    }

    fn at(millis: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .and_then(|date| date.and_hms_milli_opt(9, 26, 53, millis))
            .expect("valid timestamp")
    }

    #[tokio::test]
    async fn absent_history_loads_empty() {
        let (_, repo) = repository();

        let conversation = repo.load().await.expect("load");

        assert!(conversation.is_empty());
    }

    #[tokio::test]
    async fn saved_history_round_trips_exactly() {
        let (_, repo) = repository();
        let mut conversation = Conversation::new();
        conversation.push(Role::User, "hi", at(250));
        conversation.push(Role::Assistant, "hello there", at(250));

        repo.save(&conversation).await.expect("save");
        let loaded = repo.load().await.expect("load");

        assert_eq!(loaded, conversation);
    }

    #[tokio::test]
    async fn blob_uses_flat_message_objects() {
        let (store, repo) = repository();
        let mut conversation = Conversation::new();
        conversation.push(Role::User, "hi", at(250));

        repo.save(&conversation).await.expect("save");
        let raw = store.get("ai_messages").await.expect("get").expect("blob present");

        assert!(raw.starts_with('['));
        assert!(raw.contains(r#""role":"user""#));
        assert!(raw.contains(r#""created_at":"2025-03-14T09:26:53.250""#));
    }

    #[tokio::test]
    async fn corrupt_history_loads_empty() {
        let (store, repo) = repository();
        store.set("ai_messages", "{not json").await.expect("seed corrupt blob");

        let conversation = repo.load().await.expect("load");

        assert!(conversation.is_empty());
    }

    #[test]
    fn decode_reports_malformed_payloads() {
        let error = decode_history(r#"[{"role":"robot"}]"#).expect_err("invalid role");

        assert!(matches!(error, RepositoryError::Decode(_)));
    }
}
