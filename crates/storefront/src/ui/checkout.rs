//! Simulated checkout button.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use crate::cart_store::CartStore;
use crate::error::add_breadcrumb;

/// Resting label of the checkout button.
pub const CHECKOUT_LABEL: &str = "Checkout";

/// Label shown while an order is being placed.
pub const PROCESSING_LABEL: &str = "Processing…";

/// Confirmation shown once the cart has been cleared.
pub const ORDER_PLACED_MESSAGE: &str = "Thank you! Your order has been placed (simulated).";

/// Reasons a checkout cannot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("Checkout is already in progress.")]
    InProgress,
}

#[derive(Debug)]
struct ButtonState {
    label: String,
    disabled: bool,
}

/// The checkout button and its in-flight state.
#[derive(Debug, Clone)]
pub struct CheckoutButton {
    state: Arc<Mutex<ButtonState>>,
}

impl CheckoutButton {
    /// A button labelled `label`, enabled.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ButtonState {
                label: label.into(),
                disabled: false,
            })),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        self.state.lock().label.clone()
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.state.lock().disabled
    }

    /// Start a checkout: refuse an empty cart, otherwise disable the button
    /// and relabel it until the returned [`PendingCheckout`] completes.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when there is nothing to order and
    /// [`CheckoutError::InProgress`] while another checkout is running.
    pub fn begin(&self, store: &CartStore) -> Result<PendingCheckout, CheckoutError> {
        if store.snapshot().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut state = self.state.lock();
        if state.disabled {
            return Err(CheckoutError::InProgress);
        }
        let original_label = std::mem::replace(&mut state.label, PROCESSING_LABEL.to_string());
        state.disabled = true;
        drop(state);

        add_breadcrumb("checkout", "Checkout started", None);
        Ok(PendingCheckout {
            button: self.clone(),
            store: store.clone(),
            original_label,
        })
    }

    /// Run a whole checkout: wait `delay`, then clear the cart.
    ///
    /// # Errors
    ///
    /// See [`CheckoutButton::begin`].
    pub async fn checkout(
        &self,
        store: &CartStore,
        delay: Duration,
    ) -> Result<&'static str, CheckoutError> {
        let pending = self.begin(store)?;
        Ok(pending.complete(delay).await)
    }
}

impl Default for CheckoutButton {
    fn default() -> Self {
        Self::new(CHECKOUT_LABEL)
    }
}

/// A checkout that has started but not yet cleared the cart.
#[derive(Debug)]
#[must_use = "the button stays disabled until the checkout completes"]
pub struct PendingCheckout {
    button: CheckoutButton,
    store: CartStore,
    original_label: String,
}

impl PendingCheckout {
    /// Wait out the simulated processing time, clear the cart and restore
    /// the button. Returns the confirmation message.
    pub async fn complete(self, delay: Duration) -> &'static str {
        tokio::time::sleep(delay).await;
        self.store.clear();

        let mut state = self.button.state.lock();
        state.label = self.original_label;
        state.disabled = false;
        drop(state);

        tracing::info!("order placed");
        ORDER_PLACED_MESSAGE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chloes_boutique_core::{Money, ProductInput};

    use super::*;
    use crate::bus::ChangeBus;
    use crate::persistence::CartSlot;
    use crate::storage::MemoryOrigin;

    fn store() -> CartStore {
        let origin = MemoryOrigin::new();
        CartStore::new(CartSlot::new(Arc::new(origin.context())), ChangeBus::new())
    }

    #[tokio::test]
    async fn test_empty_cart_is_refused() {
        let store = store();
        let button = CheckoutButton::default();

        let err = button
            .checkout(&store, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(err, CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Your cart is empty.");
        assert!(!button.is_disabled());
        assert_eq!(button.label(), CHECKOUT_LABEL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_clears_after_delay() {
        let store = store();
        store.add(ProductInput::new("1", "Hat", Money::from_cents(10_000)));
        let button = CheckoutButton::default();

        let pending = button.begin(&store).unwrap();
        assert!(button.is_disabled());
        assert_eq!(button.label(), PROCESSING_LABEL);
        assert_eq!(
            button.begin(&store).unwrap_err(),
            CheckoutError::InProgress
        );

        let task = tokio::spawn(pending.complete(Duration::from_secs(1)));
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(store.item_count(), 1);

        let message = task.await.unwrap();
        assert_eq!(message, ORDER_PLACED_MESSAGE);
        assert!(store.snapshot().is_empty());
        assert!(!button.is_disabled());
        assert_eq!(button.label(), CHECKOUT_LABEL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_keeps_custom_label() {
        let store = store();
        store.add(ProductInput::new("1", "Hat", Money::from_cents(100)));
        let button = CheckoutButton::new("Place order");

        let message = button
            .checkout(&store, Duration::from_millis(500))
            .await
            .unwrap();

        assert_eq!(message, ORDER_PLACED_MESSAGE);
        assert_eq!(button.label(), "Place order");
    }
}
