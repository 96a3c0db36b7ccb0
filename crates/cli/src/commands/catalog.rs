use shopsense_core::catalog::Catalog;

use crate::commands::{to_details, CommandResult};

/// Lists the bundled demo catalog. Needs no database.
pub fn run() -> CommandResult {
    let catalog = Catalog::sample();
    CommandResult::success_with(
        "catalog",
        format!("{} products", catalog.len()),
        to_details(&catalog.products()),
    )
}
