//! Textual item identifiers.
//!
//! Product surfaces hand us ids as data attributes, JSON strings or bare
//! numbers. [`ItemId`] coerces all of them to their decimal text form so that
//! `1`, `1.0` and `"1"` name the same cart line, and comparison is always
//! plain string equality.

use core::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a cart line, compared as text.
///
/// # Example
///
/// ```rust
/// # use chloes_boutique_core::ItemId;
/// assert_eq!(ItemId::from(7_u64), ItemId::from("7"));
/// assert_eq!(ItemId::from(7.0_f64).as_str(), "7");
/// assert_ne!(ItemId::from("07"), ItemId::from(7_u64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new ID from text.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns true if the id is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Render a float the way a script runtime stringifies numbers: integral
/// values lose their fractional part, everything else keeps its shortest form.
#[allow(clippy::cast_possible_truncation)] // guarded by the magnitude check
fn float_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    format!("{value}")
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for ItemId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

impl From<&Self> for ItemId {
    fn from(id: &Self) -> Self {
        id.clone()
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for ItemId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<f64> for ItemId {
    fn from(id: f64) -> Self {
        Self(float_text(id))
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

struct ItemIdVisitor;

impl Visitor<'_> for ItemIdVisitor {
    type Value = ItemId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or number id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ItemId, E> {
        Ok(ItemId::from(v))
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ItemIdVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_text_ids_compare_equal() {
        assert_eq!(ItemId::from(42_u64), ItemId::from("42"));
        assert_eq!(ItemId::from(-3_i64), ItemId::from("-3"));
        assert_eq!(ItemId::from(2.0_f64), ItemId::from("2"));
        assert_eq!(ItemId::from(1.5_f64), ItemId::from("1.5"));
    }

    #[test]
    fn test_padded_text_does_not_collide() {
        assert_ne!(ItemId::from("007"), ItemId::from(7_u64));
        assert_ne!(ItemId::from(" 7"), ItemId::from(7_u64));
    }

    #[test]
    fn test_deserialize_string_or_number() {
        let ids: Vec<ItemId> = serde_json::from_str(r#"["a", 12, 3.0, 0.25]"#).unwrap();
        let text: Vec<&str> = ids.iter().map(ItemId::as_str).collect();
        assert_eq!(text, vec!["a", "12", "3", "0.25"]);
    }

    #[test]
    fn test_deserialize_rejects_non_scalar() {
        assert!(serde_json::from_str::<ItemId>("true").is_err());
        assert!(serde_json::from_str::<ItemId>("{}").is_err());
        assert!(serde_json::from_str::<ItemId>("null").is_err());
    }

    #[test]
    fn test_serialize_is_text() {
        let json = serde_json::to_string(&ItemId::from(9_u64)).unwrap();
        assert_eq!(json, r#""9""#);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ItemId::from("hat-01")), "hat-01");
    }
}
