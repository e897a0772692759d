//! The cart: an ordered, unique-by-id sequence of line items.
//!
//! Order is the insertion order of the first `add` for each id. Re-adding an
//! id bumps its quantity in place. Every stored line has `qty >= 1`; setting a
//! quantity to zero removes the line instead of keeping it around.

use serde::{Deserialize, Serialize};

use crate::totals::Totals;
use crate::types::{ItemId, Money, ProductInput};

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ItemId,
    pub name: String,
    pub price: Money,
    pub image: String,
    pub qty: u32,
}

impl CartItem {
    /// Create a line with quantity one from product input.
    ///
    /// Negative prices are clamped to zero and a missing image becomes `""`.
    #[must_use]
    pub fn from_product(product: ProductInput) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price.max(Money::ZERO),
            image: product.image.unwrap_or_default(),
            qty: 1,
        }
    }

    /// `price * qty` for this line.
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.price.times(self.qty)
    }
}

/// Clamp a requested quantity to `max(0, floor(n))`.
///
/// NaN becomes zero and values beyond `u32::MAX` saturate.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // float-to-int casts saturate
pub fn floor_qty(n: f64) -> u32 {
    n.max(0.0).floor() as u32
}

/// An ordered cart with at most one line per id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from arbitrary lines, normalizing them.
    ///
    /// Lines with `qty == 0` are dropped and repeated ids are merged into the
    /// first occurrence by summing quantities.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.qty == 0 {
                continue;
            }
            match cart.get_mut(&item.id) {
                Some(existing) => existing.qty = existing.qty.saturating_add(item.qty),
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Re-run normalization. A normalized cart is a fixed point.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::from_items(self.items)
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart and return its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line by id.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn get_mut(&mut self, id: &ItemId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Returns true if a line with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.qty))
    }

    /// Derived totals for the current lines.
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::for_items(&self.items)
    }

    /// Add one unit of a product.
    ///
    /// An existing line keeps its position and gains one unit; otherwise a new
    /// line with `qty = 1` is appended.
    pub fn add(&mut self, product: ProductInput) {
        match self.get_mut(&product.id) {
            Some(existing) => existing.qty = existing.qty.saturating_add(1),
            None => self.items.push(CartItem::from_product(product)),
        }
    }

    /// Set a line's quantity to `max(0, floor(qty))`, removing it at zero.
    ///
    /// Returns `false` without touching the cart if the id is absent.
    pub fn set_qty(&mut self, id: &ItemId, qty: f64) -> bool {
        let qty = floor_qty(qty);
        if qty == 0 {
            return self.remove(id);
        }
        match self.get_mut(id) {
            Some(existing) => {
                existing.qty = qty;
                true
            }
            None => false,
        }
    }

    /// Remove the line with this id. Returns `true` if a line was removed.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64) -> ProductInput {
        ProductInput::new(id, id.to_uppercase(), Money::from_cents(cents))
    }

    fn ids(cart: &Cart) -> Vec<&str> {
        cart.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));
        cart.add(product("b", 200));
        cart.add(product("c", 300));
        cart.add(product("a", 100));

        assert_eq!(ids(&cart), vec!["a", "b", "c"]);
        assert_eq!(cart.get(&ItemId::from("a")).map(|i| i.qty), Some(2));
    }

    #[test]
    fn test_add_keeps_ids_unique() {
        let mut cart = Cart::new();
        for id in ["x", "y", "x", "x", "y", "z"] {
            cart.add(product(id, 100));
        }
        let mut seen = ids(&cart);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), cart.len());
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn test_add_coerces_numeric_id() {
        let mut cart = Cart::new();
        cart.add(ProductInput::new(5_u64, "Five", Money::from_cents(500)));
        cart.add(ProductInput::new("5", "Five", Money::from_cents(500)));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].qty, 2);
    }

    #[test]
    fn test_add_defaults_image_and_clamps_price() {
        let mut cart = Cart::new();
        cart.add(product("neg", -500));
        let item = &cart.items()[0];
        assert_eq!(item.image, "");
        assert_eq!(item.price, Money::ZERO);
    }

    #[test]
    fn test_set_qty_floors_fractional() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));
        assert!(cart.set_qty(&ItemId::from("a"), 3.7));
        assert_eq!(cart.items()[0].qty, 3);
    }

    #[test]
    fn test_set_qty_zero_or_negative_removes() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));
        cart.add(product("b", 100));

        assert!(cart.set_qty(&ItemId::from("a"), 0.0));
        assert!(cart.set_qty(&ItemId::from("b"), -2.0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_qty_below_one_removes() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));
        assert!(cart.set_qty(&ItemId::from("a"), 0.9));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_qty_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));
        assert!(!cart.set_qty(&ItemId::from("missing"), 4.0));
        assert_eq!(cart.items()[0].qty, 1);
    }

    #[test]
    fn test_floor_qty_edges() {
        assert_eq!(floor_qty(f64::NAN), 0);
        assert_eq!(floor_qty(-0.5), 0);
        assert_eq!(floor_qty(2.999), 2);
        assert_eq!(floor_qty(1e12), u32::MAX);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));
        cart.add(product("b", 100));

        assert!(cart.remove(&ItemId::from("a")));
        assert!(!cart.remove(&ItemId::from("a")));
        assert_eq!(ids(&cart), vec!["b"]);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(product("a", 100));
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.totals().is_zero());
    }

    #[test]
    fn test_from_items_normalizes() {
        let line = |id: &str, qty| CartItem {
            id: ItemId::from(id),
            name: String::new(),
            price: Money::from_cents(100),
            image: String::new(),
            qty,
        };
        let cart = Cart::from_items([line("a", 1), line("b", 0), line("c", 2), line("a", 3)]);

        assert_eq!(ids(&cart), vec!["a", "c"]);
        assert_eq!(cart.get(&ItemId::from("a")).map(|i| i.qty), Some(4));
        assert_eq!(cart.clone().normalized(), cart);
    }

    #[test]
    fn test_serializes_as_sequence() {
        let mut cart = Cart::new();
        cart.add(product("1", 10_000).with_image("/hat.jpg"));
        let json = serde_json::to_value(&cart).unwrap_or_default();

        assert_eq!(
            json,
            serde_json::json!([
                {"id": "1", "name": "1", "price": 100.0, "image": "/hat.jpg", "qty": 1}
            ])
        );
    }
}
