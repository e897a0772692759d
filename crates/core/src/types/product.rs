//! Product data collected from the product surface.

use serde::{Deserialize, Serialize};

use super::{ItemId, Money};

/// The fields a product card hands to the cart when its add control fires.
///
/// Deserialization is lenient in the same places the product surface is:
/// `id` may be a string or a number, `price` may be a number or numeric text,
/// and `image` may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    /// Product identifier.
    pub id: ItemId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Image URL, if the card has one.
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductInput {
    /// Create a new product input without an image.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
        }
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
