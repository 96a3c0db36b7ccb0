use std::sync::Arc;

use shopsense_agent::{Collaborators, ShoppingAssistant};
use shopsense_core::catalog::Catalog;
use shopsense_core::config::AppConfig;
use shopsense_core::recognition::{MockRecognizer, RecognitionProvider};
use shopsense_db::repositories::{ConversationRepository, KeyValueStore, KvCartStore};
use shopsense_db::{connect_with_config, migrations, DbPool, SqlKeyValueStore};

use tracing::debug;

use super::CommandFailure;

/// Everything a command needs to talk to the engine, backed by the configured database.
pub struct Session {
    pub pool: DbPool,
    pub store: Arc<dyn KeyValueStore>,
    pub cart: Arc<KvCartStore>,
}

impl Session {
    /// Connects and applies pending migrations so first runs work without `migrate`.
    pub async fn open(config: &AppConfig) -> Result<Self, CommandFailure> {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        debug!(
            event_name = "cli.session.opened",
            database_url = %config.database.url,
            "database ready"
        );

        let store: Arc<dyn KeyValueStore> = Arc::new(SqlKeyValueStore::new(pool.clone()));
        let cart = Arc::new(KvCartStore::new(store.clone(), config.storage.cart_key.clone()));

        Ok(Self { pool, store, cart })
    }

    pub async fn assistant(
        &self,
        config: &AppConfig,
        recognizer: Arc<dyn RecognitionProvider>,
    ) -> ShoppingAssistant {
        ShoppingAssistant::open(
            Collaborators {
                catalog: Arc::new(Catalog::sample()),
                cart: self.cart.clone(),
                recognizer,
                history: ConversationRepository::new(
                    self.store.clone(),
                    config.storage.history_key.clone(),
                ),
            },
            config.assistant.clone(),
        )
        .await
    }

    pub async fn default_assistant(&self, config: &AppConfig) -> ShoppingAssistant {
        self.assistant(config, Arc::new(MockRecognizer::new())).await
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
