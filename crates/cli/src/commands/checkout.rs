//! Simulated checkout command.

use std::time::Duration;

use chloes_boutique_storefront::error::Result;
use chloes_boutique_storefront::ui::checkout::CheckoutButton;

use super::Session;

/// Place a simulated order for the current cart.
///
/// # Errors
///
/// Returns an error if the cart is empty.
#[allow(clippy::print_stdout)]
pub async fn run(session: &Session, delay: Duration) -> Result<()> {
    let button = CheckoutButton::default();
    let pending = button.begin(&session.store)?;
    println!("{}", button.label());

    let message = pending.complete(delay).await;
    println!("{message}");
    Ok(())
}
