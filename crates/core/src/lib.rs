//! Chloe's Boutique Core - Cart data model.
//!
//! This crate provides the types shared by the storefront and the CLI:
//! - `storefront` - Persistence, cart store, change bus and page collaborators
//! - `cli` - Command-line host acting as a single browsing context
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no logging. Every cart mutation here operates on an owned [`Cart`]
//! value; persisting and broadcasting the result is the storefront's job.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for item IDs, money and product input
//! - [`cart`] - The ordered, unique-by-id cart and its mutations
//! - [`totals`] - Subtotal, flat shipping and total in minor units

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod totals;
pub mod types;

pub use cart::{Cart, CartItem};
pub use totals::{FLAT_SHIPPING, Totals};
pub use types::*;
