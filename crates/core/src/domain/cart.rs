use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::product::ProductId;
use crate::errors::ApplicationError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Read-only view of the shopper's cart at the time it was requested.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
}

impl CartSnapshot {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `price * quantity` for lines whose product is still in the catalog.
    pub fn total_price(&self, catalog: &Catalog) -> Decimal {
        self.lines
            .iter()
            .filter_map(|line| {
                catalog
                    .find(&line.product_id)
                    .map(|product| product.price * Decimal::from(line.quantity))
            })
            .sum()
    }
}

/// Supplies the cart on demand. The engine never mutates cart state.
#[async_trait]
pub trait CartProvider: Send + Sync {
    async fn cart_snapshot(&self) -> Result<CartSnapshot, ApplicationError>;
}

/// Fixed cart, for shells that already hold the cart in memory.
#[derive(Clone, Debug, Default)]
pub struct StaticCart(pub CartSnapshot);

#[async_trait]
impl CartProvider for StaticCart {
    async fn cart_snapshot(&self) -> Result<CartSnapshot, ApplicationError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{CartLine, CartProvider, CartSnapshot, StaticCart};
    use crate::catalog::Catalog;
    use crate::domain::product::ProductId;

    #[test]
    fn totals_quantities_across_lines() {
        let cart = CartSnapshot::new(vec![
            CartLine { product_id: ProductId::new("1"), quantity: 2 },
            CartLine { product_id: ProductId::new("3"), quantity: 3 },
        ]);

        assert_eq!(cart.total_items(), 5);
        assert_eq!(CartSnapshot::default().total_items(), 0);
    }

    #[test]
    fn total_price_skips_products_missing_from_catalog() {
        let catalog = Catalog::sample();
        let cart = CartSnapshot::new(vec![
            CartLine { product_id: ProductId::new("1"), quantity: 2 },
            CartLine { product_id: ProductId::new("missing"), quantity: 4 },
        ]);

        assert_eq!(cart.total_price(&catalog), Decimal::new(25998, 2));
    }

    #[tokio::test]
    async fn static_cart_returns_its_snapshot() {
        let snapshot =
            CartSnapshot::new(vec![CartLine { product_id: ProductId::new("2"), quantity: 1 }]);
        let provider = StaticCart(snapshot.clone());

        assert_eq!(provider.cart_snapshot().await, Ok(snapshot));
    }
}
