use shopsense_core::catalog::Catalog;
use shopsense_core::domain::cart::CartSnapshot;
use shopsense_core::domain::product::{format_price, ProductId};
use shopsense_db::repositories::RepositoryError;

use crate::commands::session::Session;
use crate::commands::{build_runtime, load_config, to_details, CommandResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartAction {
    Show,
    Add { product_id: String, quantity: u32 },
    Remove { product_id: String },
    Update { product_id: String, quantity: u32 },
    Clear,
}

pub fn run(action: CartAction) -> CommandResult {
    let config = match load_config("cart") {
        Ok(config) => config,
        Err(result) => return result,
    };

    if let CartAction::Add { product_id, .. } = &action {
        if !Catalog::sample().contains(&ProductId::new(product_id.as_str())) {
            return CommandResult::failure(
                "cart",
                "unknown_product",
                format!("product `{product_id}` is not in the catalog"),
                10,
            );
        }
    }

    let runtime = match build_runtime("cart") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let session = Session::open(&config).await?;
        let outcome = apply(&session, action).await;
        session.close().await;
        outcome.map_err(|error| ("persistence", error.to_string(), 8u8))
    });

    match result {
        Ok(cart) => {
            let total = format_price(cart.total_price(&Catalog::sample()));
            CommandResult::success_with(
                "cart",
                format!("{} items, total ${total}", cart.total_items()),
                to_details(&cart),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("cart", error_class, message, exit_code)
        }
    }
}

async fn apply(session: &Session, action: CartAction) -> Result<CartSnapshot, RepositoryError> {
    let cart = &session.cart;
    match action {
        CartAction::Show => cart.load().await,
        CartAction::Add { product_id, quantity } => {
            cart.add(&ProductId::new(product_id), quantity).await
        }
        CartAction::Remove { product_id } => cart.remove(&ProductId::new(product_id)).await,
        CartAction::Update { product_id, quantity } => {
            cart.update_quantity(&ProductId::new(product_id), quantity).await
        }
        CartAction::Clear => {
            cart.clear().await?;
            Ok(CartSnapshot::default())
        }
    }
}
