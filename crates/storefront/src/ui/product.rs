//! "Add to cart" product cards.
//!
//! A card describes its product with `data-*` attributes. Anything missing is
//! read from the card's visible content instead: the title text for the name,
//! the price text for the price and the image's `src` for the image.

use std::collections::HashMap;

use chloes_boutique_core::{Cart, ItemId, Money, ProductInput};

use crate::cart_store::CartStore;

/// Visible content used when a `data-*` attribute is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFallbacks {
    pub title_text: Option<String>,
    pub price_text: Option<String>,
    pub image_src: Option<String>,
}

/// One product card on a listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCard {
    attributes: HashMap<String, String>,
    fallbacks: CardFallbacks,
}

impl ProductCard {
    /// Build a card from its attributes and visible content.
    pub fn from_attributes<K, V>(
        attributes: impl IntoIterator<Item = (K, V)>,
        fallbacks: CardFallbacks,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            fallbacks,
        }
    }

    /// A non-blank attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn price(&self, id: &ItemId) -> Money {
        let candidates = [
            self.attribute("data-price"),
            self.fallbacks.price_text.as_deref(),
        ];
        for raw in candidates.into_iter().flatten() {
            match Money::parse(raw) {
                Ok(price) => return price,
                Err(e) => tracing::debug!(id = %id, raw, error = %e, "unreadable price"),
            }
        }
        tracing::warn!(id = %id, "product card has no readable price, using zero");
        Money::ZERO
    }

    /// The product this card adds, or `None` when the card carries no id.
    #[must_use]
    pub fn product(&self) -> Option<ProductInput> {
        let id = ItemId::from(self.attribute("data-id")?);

        let name = self
            .attribute("data-name")
            .map(str::to_owned)
            .or_else(|| {
                self.fallbacks
                    .title_text
                    .as_deref()
                    .map(str::trim)
                    .map(str::to_owned)
            })
            .unwrap_or_default();
        let price = self.price(&id);
        let image = self
            .attribute("data-image")
            .map(str::to_owned)
            .or_else(|| self.fallbacks.image_src.clone());

        let product = ProductInput::new(id, name, price);
        Some(match image {
            Some(image) => product.with_image(image),
            None => product,
        })
    }

    /// Handle the card's "add to cart" click.
    ///
    /// Returns the updated cart, or `None` if the card has no id and was
    /// ignored.
    pub fn click(&self, store: &CartStore) -> Option<Cart> {
        let Some(product) = self.product() else {
            tracing::warn!("product card without data-id ignored");
            return None;
        };
        Some(store.add(product))
    }
}
