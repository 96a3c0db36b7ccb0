use chrono::NaiveDateTime;
use tracing::warn;

use shopsense_core::domain::message::{Conversation, Message, Role};
use shopsense_db::repositories::{ConversationRepository, RepositoryError};

/// The live conversation plus the repository it is mirrored to.
///
/// Memory is authoritative: a failed write leaves the in-memory messages in
/// place and a later `persist` writes the full state again.
pub struct ConversationLog {
    conversation: Conversation,
    repository: ConversationRepository,
}

impl ConversationLog {
    /// A store that cannot be read yields an empty log rather than an error.
    pub async fn load(repository: ConversationRepository) -> Self {
        let conversation = match repository.load().await {
            Ok(conversation) => conversation,
            Err(error) => {
                warn!(
                    event_name = "history.load.failed",
                    key = repository.key(),
                    error = %error,
                    "conversation store unreadable; starting with empty history"
                );
                Conversation::new()
            }
        };

        Self { conversation, repository }
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn len(&self) -> usize {
        self.conversation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversation.is_empty()
    }

    pub fn append(&mut self, role: Role, text: &str, now: NaiveDateTime) -> Message {
        self.conversation.push(role, text, now).clone()
    }

    pub async fn persist(&self) -> Result<(), RepositoryError> {
        self.repository.save(&self.conversation).await
    }

    pub async fn clear(&mut self) -> Result<(), RepositoryError> {
        self.conversation.clear();
        self.persist().await
    }
}
