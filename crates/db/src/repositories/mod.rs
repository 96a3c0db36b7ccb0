use async_trait::async_trait;
use thiserror::Error;

use shopsense_core::errors::ApplicationError;

pub mod cart;
pub mod conversation;
pub mod kv;
pub mod memory;

pub use cart::KvCartStore;
pub use conversation::ConversationRepository;
pub use kv::SqlKeyValueStore;
pub use memory::InMemoryKeyValueStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        ApplicationError::Persistence(error.to_string())
    }
}

/// String-keyed blob storage. Writes replace the whole value for a key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError>;
    async fn remove(&self, key: &str) -> Result<(), RepositoryError>;
}
