//! Gallery lightbox.
//!
//! Gallery items carry the URL of their large image. Opening one shows the
//! overlay and locks background scrolling; the close control, a click on the
//! backdrop, or Escape dismisses it.

/// One gallery thumbnail and the large image it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    /// URL of the full-size image.
    pub large: String,
    /// Caption / alt text.
    pub caption: String,
}

impl GalleryItem {
    /// Create a gallery item.
    #[must_use]
    pub fn new(large: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            large: large.into(),
            caption: caption.into(),
        }
    }
}

/// Lightbox overlay state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lightbox {
    current: Option<GalleryItem>,
}

impl Lightbox {
    /// A closed lightbox.
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Show an item. Items without a large-image URL are ignored.
    ///
    /// Returns true if the overlay is now showing `item`.
    pub fn open(&mut self, item: GalleryItem) -> bool {
        if item.large.trim().is_empty() {
            tracing::debug!("gallery item has no large image");
            return false;
        }
        self.current = Some(item);
        true
    }

    /// Hide the overlay.
    pub fn close(&mut self) {
        self.current = None;
    }

    /// Handle a key press; Escape closes. Returns true if the key closed it.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if key == "Escape" && self.is_open() {
            self.close();
            return true;
        }
        false
    }

    /// Returns true while an item is shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// URL of the image being shown.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.current.as_ref().map(|item| item.large.as_str())
    }

    /// Caption of the image being shown.
    #[must_use]
    pub fn caption(&self) -> Option<&str> {
        self.current.as_ref().map(|item| item.caption.as_str())
    }

    /// Whether the page body should stop scrolling behind the overlay.
    #[must_use]
    pub const fn body_scroll_locked(&self) -> bool {
        self.is_open()
    }

    /// Value for the overlay's `aria-hidden` attribute.
    #[must_use]
    pub const fn aria_hidden(&self) -> &'static str {
        if self.is_open() { "false" } else { "true" }
    }
}
