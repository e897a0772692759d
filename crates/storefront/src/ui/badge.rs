//! Cart count badge.
//!
//! Every element with the [`BADGE_CLASS`] class shows the total quantity in
//! the cart, or nothing at all when the cart is empty.

use askama::Template;
use chloes_boutique_core::Cart;
use tokio::sync::broadcast;

use crate::bus::CartUpdated;

/// Class carried by badge elements.
pub const BADGE_CLASS: &str = "cart-badge";

/// Badge text for a quantity: empty when zero.
#[must_use]
pub fn badge_text(count: u32) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}

/// Cart count badge fragment template.
#[derive(Template)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count_text: String,
}

/// The text shown by every badge element on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartBadge {
    elements: Vec<String>,
}

impl CartBadge {
    /// A page with `elements` badge elements, all blank.
    #[must_use]
    pub fn new(elements: usize) -> Self {
        Self {
            elements: vec![String::new(); elements],
        }
    }

    /// Write the cart's quantity onto every element.
    pub fn refresh(&mut self, cart: &Cart) {
        let text = badge_text(cart.item_count());
        for element in &mut self.elements {
            element.clone_from(&text);
        }
    }

    /// Re-render from a change event's payload.
    pub fn apply(&mut self, event: &CartUpdated) {
        self.refresh(&event.cart);
    }

    /// Apply every event waiting on `rx`. Returns how many were applied.
    pub fn drain(&mut self, rx: &mut broadcast::Receiver<CartUpdated>) -> usize {
        let mut applied = 0;
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    self.apply(&event);
                    applied += 1;
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "badge skipped stale cart events");
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return applied,
            }
        }
    }

    /// Text of each badge element.
    #[must_use]
    pub fn texts(&self) -> &[String] {
        &self.elements
    }

    /// Text of the first badge element, or `""` when there are none.
    #[must_use]
    pub fn text(&self) -> &str {
        self.elements.first().map_or("", String::as_str)
    }

    /// Render the badge fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> askama::Result<String> {
        CartCountTemplate {
            count_text: self.text().to_owned(),
        }
        .render()
    }
}

impl Default for CartBadge {
    fn default() -> Self {
        Self::new(1)
    }
}
