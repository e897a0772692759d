//! Cart persistence slot.
//!
//! [`CartSlot`] owns the serialization boundary between a [`Cart`] and the
//! single storage key that holds it. Reads never fail: an absent, empty or
//! malformed slot is the empty cart. Writes are best effort: a failure is
//! logged and reported as `false`, never raised.
//!
//! # Format
//!
//! The slot holds a JSON array of `{id, name, price, image, qty}` records.
//! The key carries a version suffix; bumping it abandons old data.

use std::sync::Arc;

use chloes_boutique_core::cart::floor_qty;
use chloes_boutique_core::{Cart, CartItem, ItemId, Money};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::storage::{SlotStore, StorageEvents};

/// Storage key for the cart.
pub const CART_KEY: &str = "chloes_boutique_cart_v1";

/// Why a slot value could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The value is not JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The value is JSON but not an array.
    #[error("expected a sequence, found {0}")]
    NotASequence(&'static str),
}

/// A stored record as it may appear in the slot, before normalization.
#[derive(Debug, Deserialize)]
struct StoredItem {
    id: ItemId,
    #[serde(default)]
    name: Option<String>,
    price: Money,
    #[serde(default)]
    image: Option<String>,
    qty: f64,
}

impl From<StoredItem> for CartItem {
    fn from(stored: StoredItem) -> Self {
        Self {
            id: stored.id,
            name: stored.name.unwrap_or_default(),
            price: stored.price.max(Money::ZERO),
            image: stored.image.unwrap_or_default(),
            qty: floor_qty(stored.qty),
        }
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode a slot value into a normalized cart.
///
/// Individual records that cannot be read (missing id, non-numeric price or
/// quantity) are dropped; records with a quantity below one are dropped;
/// repeated ids are merged.
///
/// # Errors
///
/// Returns an error if the value is not JSON or not a JSON array, so callers
/// can tell a malformed slot from an empty but valid one.
pub fn decode_cart(raw: &str) -> Result<Cart, DecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(entries) = value else {
        return Err(DecodeError::NotASequence(kind_of(&value)));
    };

    let items = entries.into_iter().filter_map(|entry| {
        serde_json::from_value::<StoredItem>(entry)
            .map_err(|e| tracing::debug!(error = %e, "dropping unreadable cart record"))
            .ok()
            .map(CartItem::from)
    });

    Ok(Cart::from_items(items))
}

/// Encode a cart into its slot representation.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_cart(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(cart)
}

/// The cart's storage slot within a [`SlotStore`].
#[derive(Debug, Clone)]
pub struct CartSlot {
    store: Arc<dyn SlotStore>,
    key: String,
}

impl CartSlot {
    /// Create a slot at [`CART_KEY`].
    #[must_use]
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self::with_key(store, CART_KEY)
    }

    /// Create a slot at a custom key.
    #[must_use]
    pub fn with_key(store: Arc<dyn SlotStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the cart. Absent, empty or malformed slots yield the empty cart.
    #[must_use]
    pub fn read(&self) -> Cart {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "cart storage unavailable");
                return Cart::new();
            }
        };

        if raw.trim().is_empty() {
            return Cart::new();
        }

        decode_cart(&raw).unwrap_or_else(|e| {
            tracing::warn!(key = %self.key, error = %e, "ignoring malformed cart slot");
            Cart::new()
        })
    }

    /// Replace the slot with `cart`. Returns `false` if the write failed.
    pub fn write(&self, cart: &Cart) -> bool {
        let encoded = match encode_cart(cart) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to encode cart");
                return false;
            }
        };

        match self.store.set(&self.key, &encoded) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to save cart");
                false
            }
        }
    }

    /// Subscribe to writes of this slot made by other contexts.
    #[must_use]
    pub fn subscribe(&self) -> ExternalChanges {
        ExternalChanges {
            slot: self.clone(),
            events: self.store.events(),
        }
    }
}

/// Carts written to a slot by other contexts, re-read on arrival.
#[derive(Debug)]
pub struct ExternalChanges {
    slot: CartSlot,
    events: StorageEvents,
}

impl ExternalChanges {
    /// Take the next pending external change without waiting.
    pub fn try_next(&mut self) -> Option<Cart> {
        while let Some(event) = self.events.try_next() {
            if event.key == self.slot.key {
                return Some(self.slot.read());
            }
        }
        None
    }

    /// Wait for the next external change. Returns `None` once the origin is gone.
    pub async fn next(&mut self) -> Option<Cart> {
        while let Some(event) = self.events.next().await {
            if event.key == self.slot.key {
                return Some(self.slot.read());
            }
        }
        None
    }
}
