//! Contact form validation.
//!
//! Fields are checked in page order (name, email, message) and the first
//! failure is reported so the page can show its message and focus the field.
//! Nothing is sent anywhere; a valid form only produces a thank-you message.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("Invalid regex"));

/// A contact form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    /// The input's `name` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ContactError {
    /// Field to focus.
    pub field: ContactField,
    /// Message to show.
    pub message: &'static str,
}

/// Submitted contact form values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Returns true if `email` looks like `something@domain.tld`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

impl ContactForm {
    /// Create a form from its three values.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Check every field, reporting the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first offending field and its message.
    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.trim().is_empty() {
            return Err(ContactError {
                field: ContactField::Name,
                message: "Please enter your name.",
            });
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ContactError {
                field: ContactField::Email,
                message: "Please enter a valid email address.",
            });
        }
        if self.message.trim().is_empty() {
            return Err(ContactError {
                field: ContactField::Message,
                message: "Please enter a message.",
            });
        }
        Ok(())
    }

    /// Validate and build the confirmation shown after a simulated send.
    ///
    /// # Errors
    ///
    /// Returns the first offending field and its message.
    pub fn submit(&self) -> Result<String, ContactError> {
        self.validate()?;
        tracing::info!("contact form accepted");
        Ok(format!(
            "Thanks, {}! Your message has been sent.",
            self.name.trim()
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_form() {
        let form = ContactForm::new("Chloe", "chloe@example.co.za", "Do you ship to Durban?");
        assert!(form.validate().is_ok());
        assert_eq!(form.submit().unwrap(), "Thanks, Chloe! Your message has been sent.");
    }

    #[test]
    fn test_first_offending_field_is_reported() {
        let form = ContactForm::new(" ", "bad", "");
        let err = form.validate().unwrap_err();
        assert_eq!(err.field, ContactField::Name);
        assert_eq!(err.to_string(), "Please enter your name.");

        let form = ContactForm::new("Ann", "bad", "");
        assert_eq!(form.validate().unwrap_err().field, ContactField::Email);

        let form = ContactForm::new("Ann", "ann@shop.com", "  ");
        assert_eq!(form.validate().unwrap_err().field, ContactField::Message);
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.c"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("no-at-symbol.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("@."));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_field_names() {
        assert_eq!(ContactField::Email.as_str(), "email");
        assert_eq!(ContactField::Message.to_string(), "message");
    }
}
