//! Derived cart totals.

use serde::Serialize;

use crate::cart::CartItem;
use crate::types::Money;

/// Flat shipping charged whenever the subtotal is strictly positive (R30.00).
pub const FLAT_SHIPPING: Money = Money::from_cents(3000);

/// Subtotal, shipping and total for a cart, in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    /// Sum of `price * qty` over all items.
    pub subtotal: Money,
    /// [`FLAT_SHIPPING`] when the subtotal is positive, otherwise zero.
    pub shipping: Money,
    /// `subtotal + shipping`.
    pub total: Money,
}

impl Totals {
    /// Compute totals for a sequence of items.
    #[must_use]
    pub fn for_items<'a>(items: impl IntoIterator<Item = &'a CartItem>) -> Self {
        let subtotal: Money = items.into_iter().map(CartItem::line_total).sum();
        let shipping = if subtotal.is_positive() {
            FLAT_SHIPPING
        } else {
            Money::ZERO
        };

        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    /// Returns true if every component is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.subtotal.is_zero() && self.shipping.is_zero() && self.total.is_zero()
    }
}
