//! Unified error handling with Sentry integration.
//!
//! The cart core itself never fails; these errors cover the surfaces around
//! it (configuration, templates, user input) and are what host binaries
//! report. [`AppError::capture`] forwards server-side failures to Sentry.

use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::ui::checkout::CheckoutError;
use crate::ui::contact::ContactError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage backend could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Contact form failed validation.
    #[error("Contact form: {0}")]
    Contact(#[from] ContactError),

    /// Checkout could not start.
    #[error("Checkout: {0}")]
    Checkout(#[from] CheckoutError),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Returns true for failures the user caused and can fix.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Contact(_) | Self::Checkout(_) | Self::BadRequest(_)
        )
    }

    /// Log the error and, for non-user errors, capture it to Sentry.
    pub fn capture(&self) {
        if self.is_user_error() {
            tracing::warn!(error = %self, "Request rejected");
            return;
        }

        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("price must be numeric".to_string());
        assert_eq!(err.to_string(), "Bad request: price must be numeric");

        let err = AppError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout: Your cart is empty.");
    }

    #[test]
    fn test_user_errors() {
        assert!(AppError::BadRequest("x".to_string()).is_user_error());
        assert!(AppError::from(CheckoutError::EmptyCart).is_user_error());
        assert!(!AppError::from(StorageError::Disabled).is_user_error());
    }

    #[test]
    fn test_capture_without_client_is_harmless() {
        AppError::from(StorageError::Disabled).capture();
        add_breadcrumb("cart", "Cleared cart", None);
    }
}
