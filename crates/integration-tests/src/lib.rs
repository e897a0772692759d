//! End-to-end tests for the Chloe's Boutique cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p chloes-boutique-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Literal user journeys over one origin
//! - `cross_context` - Several browsing contexts sharing an origin
//!
//! Everything runs against the in-memory origin or a temporary directory;
//! no external services are needed.

use std::sync::Arc;

use chloes_boutique_storefront::bus::ChangeBus;
use chloes_boutique_storefront::cart_store::CartStore;
use chloes_boutique_storefront::persistence::{CART_KEY, CartSlot};
use chloes_boutique_storefront::storage::{MemoryOrigin, MemoryStorage, SlotStore};

/// One simulated origin with any number of tabs.
#[derive(Debug, Default)]
pub struct TestOrigin {
    origin: MemoryOrigin,
}

/// A browsing context: its raw storage handle and its cart store.
#[derive(Debug, Clone)]
pub struct Tab {
    pub storage: Arc<MemoryStorage>,
    pub store: CartStore,
}

impl TestOrigin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared origin, for switching storage off or peeking at raw values.
    #[must_use]
    pub const fn origin(&self) -> &MemoryOrigin {
        &self.origin
    }

    /// Open a new tab on this origin.
    #[must_use]
    pub fn tab(&self) -> Tab {
        let storage = Arc::new(self.origin.context());
        let slot = CartSlot::new(storage.clone());
        Tab {
            storage,
            store: CartStore::new(slot, ChangeBus::new()),
        }
    }

    /// Preload the cart slot before any tab reads it.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory origin refuses the write.
    pub fn preload(&self, raw: &str) {
        self.origin
            .context()
            .set(CART_KEY, raw)
            .expect("in-memory origin accepts writes");
    }

    /// Raw text currently in the cart slot.
    #[must_use]
    pub fn raw_cart(&self) -> Option<String> {
        self.origin.raw(CART_KEY)
    }
}
