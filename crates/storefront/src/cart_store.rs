//! The cart store: the only component that mutates the cart.
//!
//! Every mutation follows the same four steps:
//! 1. Load the current cart from the slot
//! 2. Apply the mutation to that snapshot
//! 3. Write the result back
//! 4. Broadcast the result on the change bus
//!
//! Reloading before each mutation keeps a context correct after other
//! contexts have written the slot; concurrent writers resolve as
//! last-writer-wins.
//!
//! A failed write does not roll the mutation back. The intended cart is kept
//! in memory and served to this context until a later write succeeds or
//! another context's write supersedes it.

use std::sync::Arc;

use chloes_boutique_core::{Cart, ItemId, ProductInput, Totals};
use parking_lot::Mutex;
use tracing::instrument;

use crate::bus::ChangeBus;
use crate::error::add_breadcrumb;
use crate::persistence::{CartSlot, ExternalChanges};

/// Cart mutations, snapshots and totals for one browsing context.
///
/// Cheaply cloneable; clones share the slot, bus and pending state.
#[derive(Debug, Clone)]
pub struct CartStore {
    slot: CartSlot,
    bus: ChangeBus,
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    /// Cart whose write failed; authoritative for this context until cleared.
    unsaved: Mutex<Option<Cart>>,
    external: Mutex<ExternalChanges>,
}

impl CartStore {
    /// Create a store over a slot, announcing changes on `bus`.
    ///
    /// External writes are tracked from this point on.
    #[must_use]
    pub fn new(slot: CartSlot, bus: ChangeBus) -> Self {
        let external = slot.subscribe();
        Self {
            slot,
            bus,
            inner: Arc::new(StoreInner {
                unsaved: Mutex::new(None),
                external: Mutex::new(external),
            }),
        }
    }

    /// The change bus this store broadcasts on.
    #[must_use]
    pub const fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    /// The persistence slot backing this store.
    #[must_use]
    pub const fn slot(&self) -> &CartSlot {
        &self.slot
    }

    fn load(&self) -> Cart {
        if let Some(cart) = self.inner.unsaved.lock().clone() {
            return cart;
        }
        self.slot.read()
    }

    fn commit(&self, cart: Cart) -> Cart {
        if self.slot.write(&cart) {
            *self.inner.unsaved.lock() = None;
        } else {
            tracing::warn!(
                items = cart.len(),
                "cart not persisted, keeping in-memory copy"
            );
            *self.inner.unsaved.lock() = Some(cart.clone());
        }
        self.bus.broadcast(cart.clone());
        cart
    }

    /// Add one unit of a product, appending a new line if needed.
    #[instrument(skip(self, product), fields(id = %product.id))]
    pub fn add(&self, product: ProductInput) -> Cart {
        add_breadcrumb("cart", "Added item", Some(&[("id", product.id.as_str())]));
        let mut cart = self.load();
        cart.add(product);
        tracing::debug!(items = cart.len(), count = cart.item_count(), "item added");
        self.commit(cart)
    }

    /// Set a line's quantity to `max(0, floor(qty))`; zero removes the line.
    ///
    /// An absent id is a no-op: nothing is written or broadcast.
    #[instrument(skip(self, id))]
    pub fn set_qty(&self, id: impl Into<ItemId>, qty: f64) -> Cart {
        let id = id.into();
        let mut cart = self.load();
        if !cart.set_qty(&id, qty) {
            tracing::debug!(id = %id, "quantity change for absent item ignored");
            return cart;
        }
        add_breadcrumb("cart", "Changed quantity", Some(&[("id", id.as_str())]));
        self.commit(cart)
    }

    /// Remove a line if present. The result is written and broadcast either way.
    #[instrument(skip(self, id))]
    pub fn remove(&self, id: impl Into<ItemId>) -> Cart {
        let id = id.into();
        let mut cart = self.load();
        if cart.remove(&id) {
            add_breadcrumb("cart", "Removed item", Some(&[("id", id.as_str())]));
        }
        self.commit(cart)
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&self) -> Cart {
        add_breadcrumb("cart", "Cleared cart", None);
        self.commit(Cart::new())
    }

    /// The current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.load()
    }

    /// Totals for a cart.
    #[must_use]
    pub fn totals(&self, cart: &Cart) -> Totals {
        cart.totals()
    }

    /// Sum of quantities in the current cart.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.load().item_count()
    }

    fn accept_external(&self, cart: Cart) {
        *self.inner.unsaved.lock() = None;
        tracing::debug!(items = cart.len(), "cart changed in another context");
        self.bus.on_external_change(cart);
    }

    /// Rebroadcast every external write received since the last call.
    ///
    /// Returns the number of `cart-updated` events emitted.
    pub fn sync_external(&self) -> usize {
        let mut emitted = 0;
        loop {
            let next = self.inner.external.lock().try_next();
            let Some(cart) = next else {
                break;
            };
            self.accept_external(cart);
            emitted += 1;
        }
        emitted
    }

    /// Rebroadcast external writes as they arrive, until the origin closes.
    ///
    /// The subscription is taken when this is called, not when the returned
    /// future is first polled.
    pub fn run_external_sync(self) -> impl Future<Output = ()> + Send {
        let mut changes = self.slot.subscribe();
        async move {
            while let Some(cart) = changes.next().await {
                self.accept_external(cart);
            }
        }
    }
}
