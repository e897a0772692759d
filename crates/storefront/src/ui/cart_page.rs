//! The cart page: line items, quantity inputs, totals and actions.
//!
//! The page is a pure function of the cart. It re-renders from the payload of
//! every `cart-updated` event rather than tracking changes itself.

use std::time::Duration;

use askama::Template;
use chloes_boutique_core::{Cart, CartItem, ItemId, Totals};

use crate::bus::CartUpdated;
use crate::cart_store::CartStore;
use crate::filters;
use crate::ui::checkout::{CheckoutButton, CheckoutError};

/// Question asked before emptying the cart.
pub const CLEAR_PROMPT: &str = "Clear all items from your cart?";

// =============================================================================
// View Types
// =============================================================================

/// A cart line prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: String,
    pub qty: u32,
    pub line_total: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            price: item.price.to_string(),
            qty: item.qty,
            line_total: item.line_total().to_string(),
        }
    }
}

/// The cart prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub is_empty: bool,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.iter().map(CartItemView::from).collect(),
            is_empty: cart.is_empty(),
            item_count: cart.item_count(),
        }
    }
}

/// Totals prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsView {
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl From<Totals> for TotalsView {
    fn from(totals: Totals) -> Self {
        Self {
            subtotal: totals.subtotal.to_string(),
            shipping: totals.shipping.to_string(),
            total: totals.total.to_string(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Full cart page template.
#[derive(Template)]
#[template(path = "cart/page.html")]
pub struct CartPageTemplate {
    pub cart: CartView,
    pub totals: TotalsView,
    pub checkout_label: String,
    pub checkout_disabled: bool,
}

/// Cart items fragment template.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart totals fragment template.
#[derive(Template)]
#[template(path = "partials/cart_totals.html")]
pub struct CartTotalsTemplate {
    pub totals: TotalsView,
}

// =============================================================================
// Input Handling
// =============================================================================

/// Read a quantity input the way a browser's integer parse would: optional
/// leading whitespace and sign, then digits. Anything unreadable or below one
/// becomes one.
#[must_use]
pub fn parse_quantity(raw: &str) -> u32 {
    let s = raw.trim_start();
    let (negative, rest) = s
        .strip_prefix('-')
        .map_or_else(|| (false, s.strip_prefix('+').unwrap_or(s)), |rest| (true, rest));
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, _) = rest.split_at(end);

    if negative || digits.is_empty() {
        return 1;
    }
    // Overlong inputs saturate instead of wrapping
    digits.parse::<u32>().unwrap_or(u32::MAX).max(1)
}

/// Something that can answer a yes/no question, like a confirmation dialog.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

// =============================================================================
// Page
// =============================================================================

/// The cart page bound to a store.
#[derive(Debug, Clone)]
pub struct CartPage {
    store: CartStore,
    checkout: CheckoutButton,
}

impl CartPage {
    #[must_use]
    pub fn new(store: CartStore) -> Self {
        Self {
            store,
            checkout: CheckoutButton::default(),
        }
    }

    #[must_use]
    pub const fn checkout_button(&self) -> &CheckoutButton {
        &self.checkout
    }

    /// Render the whole page for a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self, cart: &Cart) -> askama::Result<String> {
        CartPageTemplate {
            cart: CartView::from(cart),
            totals: TotalsView::from(cart.totals()),
            checkout_label: self.checkout.label(),
            checkout_disabled: self.checkout.is_disabled(),
        }
        .render()
    }

    /// Render the page for the store's current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_current(&self) -> askama::Result<String> {
        self.render(&self.store.snapshot())
    }

    /// Render only the line items, or the empty-cart message.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_items(cart: &Cart) -> askama::Result<String> {
        CartItemsTemplate {
            cart: CartView::from(cart),
        }
        .render()
    }

    /// Render only the totals panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_totals(cart: &Cart) -> askama::Result<String> {
        CartTotalsTemplate {
            totals: TotalsView::from(cart.totals()),
        }
        .render()
    }

    /// Re-render in response to a `cart-updated` event.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn apply(&self, event: &CartUpdated) -> askama::Result<String> {
        self.render(&event.cart)
    }

    /// Handle an edited quantity input. Returns the text to write back into
    /// the input.
    pub fn change_quantity(&self, id: impl Into<ItemId>, raw: &str) -> String {
        let qty = parse_quantity(raw);
        self.store.set_qty(id, f64::from(qty));
        qty.to_string()
    }

    /// Handle a "remove" button.
    pub fn remove(&self, id: impl Into<ItemId>) -> Cart {
        self.store.remove(id)
    }

    /// Handle "clear cart": empties the cart only if `confirm` accepts.
    pub fn clear(&self, confirm: &impl Confirm) -> bool {
        if !confirm.confirm(CLEAR_PROMPT) {
            tracing::debug!("clear cart declined");
            return false;
        }
        self.store.clear();
        true
    }

    /// Handle the checkout button.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] when the cart is empty or a checkout is
    /// already running.
    pub async fn checkout(&self, delay: Duration) -> Result<&'static str, CheckoutError> {
        self.checkout.checkout(&self.store, delay).await
    }
}
