//! Presentation collaborators.
//!
//! None of these mutate the cart directly: they call [`crate::CartStore`]
//! operations and re-render from `cart-updated` payloads. The remaining
//! page widgets (navigation, lightbox, contact form, footer) do not touch the
//! cart at all.

pub mod badge;
pub mod cart_page;
pub mod checkout;
pub mod contact;
pub mod footer;
pub mod lightbox;
pub mod nav;
pub mod product;

pub use badge::{CartBadge, badge_text};
pub use cart_page::{CartPage, Confirm, parse_quantity};
pub use checkout::{CheckoutButton, CheckoutError};
pub use contact::{ContactError, ContactForm};
pub use lightbox::{GalleryItem, Lightbox};
pub use nav::NavToggle;
pub use product::{CardFallbacks, ProductCard};
