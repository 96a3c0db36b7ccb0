use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use shopsense_core::domain::cart::{CartLine, CartProvider, CartSnapshot};
use shopsense_core::domain::product::ProductId;
use shopsense_core::errors::ApplicationError;

use super::{KeyValueStore, RepositoryError};

/// Cart kept as a JSON array of lines under a single key.
#[derive(Clone)]
pub struct KvCartStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl KvCartStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub async fn load(&self) -> Result<CartSnapshot, RepositoryError> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(CartSnapshot::default());
        };

        match serde_json::from_str::<Vec<CartLine>>(&raw) {
            Ok(lines) => Ok(CartSnapshot::new(lines)),
            Err(error) => {
                warn!(
                    event_name = "cart.load.discarded",
                    key = %self.key,
                    error = %error,
                    "stored cart could not be parsed; treating as empty"
                );
                Ok(CartSnapshot::default())
            }
        }
    }

    /// Adds `quantity` to an existing line or appends a new one.
    pub async fn add(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartSnapshot, RepositoryError> {
        let mut cart = self.load().await?;
        match cart.lines.iter_mut().find(|line| &line.product_id == product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => cart.lines.push(CartLine { product_id: product_id.clone(), quantity }),
        }
        self.save(&cart).await?;
        Ok(cart)
    }

    pub async fn remove(&self, product_id: &ProductId) -> Result<CartSnapshot, RepositoryError> {
        let mut cart = self.load().await?;
        cart.lines.retain(|line| &line.product_id != product_id);
        self.save(&cart).await?;
        Ok(cart)
    }

    /// A quantity of zero removes the line.
    pub async fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartSnapshot, RepositoryError> {
        if quantity == 0 {
            return self.remove(product_id).await;
        }

        let mut cart = self.load().await?;
        if let Some(line) = cart.lines.iter_mut().find(|line| &line.product_id == product_id) {
            line.quantity = quantity;
        }
        self.save(&cart).await?;
        Ok(cart)
    }

    pub async fn clear(&self) -> Result<(), RepositoryError> {
        self.store.remove(&self.key).await
    }

    async fn save(&self, cart: &CartSnapshot) -> Result<(), RepositoryError> {
        let encoded =
            serde_json::to_string(&cart.lines).map_err(|e| RepositoryError::Encode(e.to_string()))?;
        self.store.set(&self.key, &encoded).await
    }
}

#[async_trait]
impl CartProvider for KvCartStore {
    async fn cart_snapshot(&self) -> Result<CartSnapshot, ApplicationError> {
        Ok(self.load().await?)
    }
}
