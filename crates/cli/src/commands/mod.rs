//! Command implementations.

pub mod cart;
pub mod checkout;
pub mod contact;
pub mod watch;

use std::sync::Arc;

use chloes_boutique_storefront::bus::ChangeBus;
use chloes_boutique_storefront::cart_store::CartStore;
use chloes_boutique_storefront::config::BoutiqueConfig;
use chloes_boutique_storefront::persistence::CartSlot;
use chloes_boutique_storefront::storage::FileStorage;

/// One browsing context over the configured data directory.
pub struct Session {
    pub storage: Arc<FileStorage>,
    pub store: CartStore,
}

impl Session {
    /// Open the origin at the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(config: &BoutiqueConfig) -> chloes_boutique_storefront::Result<Self> {
        let storage = Arc::new(FileStorage::open(&config.data_dir)?);
        tracing::debug!(root = %storage.root().display(), "opened storage origin");

        let slot = CartSlot::new(storage.clone());
        let store = CartStore::new(slot, ChangeBus::new());
        Ok(Self { storage, store })
    }
}
