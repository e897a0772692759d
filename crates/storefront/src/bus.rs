//! In-page change notifications.
//!
//! The [`ChangeBus`] fans a `cart-updated` event out to every subscriber
//! (badges, the cart page) after each mutation and after each external write.
//! Delivery uses a broadcast channel, so a subscriber that mutates the cart
//! while handling an event simply enqueues another event instead of recursing.

use chloes_boutique_core::Cart;
use serde::Serialize;
use tokio::sync::broadcast;

/// Name of the in-page change event.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Default number of events a slow subscriber may fall behind by.
const DEFAULT_CAPACITY: usize = 64;

/// Where a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOrigin {
    /// A mutation in this context.
    Local,
    /// A write by another context of the same origin.
    External,
}

/// Payload of a `cart-updated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartUpdated {
    /// The cart at broadcast time.
    pub cart: Cart,
    /// Where the change came from.
    pub origin: ChangeOrigin,
}

impl CartUpdated {
    /// The event name, `cart-updated`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        CART_UPDATED_EVENT
    }
}

/// Publish/subscribe surface for cart changes.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<CartUpdated>,
}

impl ChangeBus {
    /// Create a bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus that buffers up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartUpdated> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Announce a local change. Returns the number of subscribers reached.
    pub fn broadcast(&self, cart: Cart) -> usize {
        self.publish(cart, ChangeOrigin::Local)
    }

    /// Announce a change written by another context.
    pub fn on_external_change(&self, cart: Cart) -> usize {
        self.publish(cart, ChangeOrigin::External)
    }

    fn publish(&self, cart: Cart, origin: ChangeOrigin) -> usize {
        tracing::trace!(event = CART_UPDATED_EVENT, ?origin, items = cart.len(), "broadcast");
        // No subscribers is fine
        self.tx.send(CartUpdated { cart, origin }).unwrap_or(0)
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chloes_boutique_core::{Money, ProductInput};

    use super::*;

    #[test]
    fn test_broadcast_reaches_every_subscriber() {
        let bus = ChangeBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        let mut cart = Cart::new();
        cart.add(ProductInput::new("1", "Hat", Money::from_cents(100)));

        assert_eq!(bus.broadcast(cart.clone()), 2);

        for rx in [&mut a, &mut b] {
            let event = rx.try_recv().unwrap();
            assert_eq!(event.cart, cart);
            assert_eq!(event.origin, ChangeOrigin::Local);
            assert_eq!(event.name(), "cart-updated");
        }
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let bus = ChangeBus::new();
        assert_eq!(bus.broadcast(Cart::new()), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_external_change_is_tagged() {
        let bus = ChangeBus::new();
        let mut rx = bus.subscribe();
        bus.on_external_change(Cart::new());
        assert_eq!(rx.try_recv().unwrap().origin, ChangeOrigin::External);
    }

    #[test]
    fn test_mutating_from_a_subscriber_settles() {
        use std::sync::Arc;

        use crate::cart_store::CartStore;
        use crate::persistence::CartSlot;
        use crate::storage::MemoryOrigin;

        let bus = ChangeBus::new();
        let store = CartStore::new(
            CartSlot::new(Arc::new(MemoryOrigin::new().context())),
            bus.clone(),
        );
        let mut rx = bus.subscribe();

        store.add(ProductInput::new("1", "Hat", Money::from_cents(100)));
        store.add(ProductInput::new("2", "Scarf", Money::from_cents(200)));

        // Remove every line named in each payload. Stale payloads name lines
        // that are already gone, so those removes are fixed points.
        let mut handled = 0;
        while let Ok(event) = rx.try_recv() {
            handled += 1;
            assert!(handled < 32, "notification chain did not settle");
            for item in &event.cart {
                store.remove(item.id.clone());
            }
        }

        assert_eq!(handled, 7);
        assert!(store.snapshot().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_serializes_with_origin() {
        let event = CartUpdated {
            cart: Cart::new(),
            origin: ChangeOrigin::External,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"cart": [], "origin": "external"})
        );
    }
}
