use chrono::{Duration, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One chat message. `created_at` is a timezone-naive UTC timestamp that is
/// persisted as ISO-8601 and must round-trip without loss.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub created_at: NaiveDateTime,
}

/// Ordered, append-only message sequence. Only `clear` removes messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Appends a message stamped no earlier than `now` and strictly after the
    /// previous message, at millisecond precision. The id is the stamp in
    /// epoch milliseconds, so ids stay unique within the conversation.
    pub fn push(&mut self, role: Role, text: impl Into<String>, now: NaiveDateTime) -> &Message {
        let created_at = self.next_timestamp(now);
        let message = Message {
            id: MessageId(created_at.and_utc().timestamp_millis().to_string()),
            role,
            text: text.into(),
            created_at,
        };
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn next_timestamp(&self, now: NaiveDateTime) -> NaiveDateTime {
        let now = now.trunc_subsecs(3);
        match self.messages.last() {
            Some(last) if now <= last.created_at => {
                last.created_at.trunc_subsecs(3) + Duration::milliseconds(1)
            }
            _ => now,
        }
    }
}
