//! Core types for Chloe's Boutique.
//!
//! This module provides type-safe wrappers for the values that flow from the
//! product surface into the cart.

pub mod id;
pub mod money;
pub mod product;

pub use id::ItemId;
pub use money::{Money, MoneyError};
pub use product::ProductInput;
