//! Mobile navigation toggle.

/// Open/closed state of the primary navigation on small screens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavToggle {
    open: bool,
}

impl NavToggle {
    /// Class added to the primary nav while open.
    pub const OPEN_CLASS: &'static str = "open";

    /// A closed navigation.
    #[must_use]
    pub const fn new() -> Self {
        Self { open: false }
    }

    /// Flip the state. Returns the new open state.
    pub const fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Close the navigation.
    pub const fn close(&mut self) {
        self.open = false;
    }

    /// Returns true while the navigation is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Value for the toggle's `aria-expanded` attribute.
    #[must_use]
    pub const fn aria_expanded(&self) -> &'static str {
        if self.open { "true" } else { "false" }
    }

    /// Class list fragment for the nav element.
    #[must_use]
    pub const fn nav_class(&self) -> &'static str {
        if self.open { Self::OPEN_CLASS } else { "" }
    }

    /// Handle a key press; Escape closes an open menu.
    ///
    /// Returns true if the key changed the state.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if key == "Escape" && self.open {
            self.close();
            return true;
        }
        false
    }
}
