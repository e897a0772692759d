//! Chloe's Boutique storefront library.
//!
//! The persistent cart and everything around it: host storage backends, the
//! cart slot, the cart store, the in-page change bus and the page widgets
//! that render from it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bus;
pub mod cart_store;
pub mod config;
pub mod error;
pub mod filters;
pub mod persistence;
pub mod storage;
pub mod ui;

pub use bus::{CART_UPDATED_EVENT, CartUpdated, ChangeBus, ChangeOrigin};
pub use cart_store::CartStore;
pub use config::BoutiqueConfig;
pub use error::{AppError, Result};
pub use persistence::{CART_KEY, CartSlot};
pub use storage::{FileStorage, MemoryOrigin, MemoryStorage, SlotStore, StorageError};
