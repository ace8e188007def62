//! Newtype ID for type-safe product references.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An opaque product identifier.
///
/// Product feeds identify products with UUID strings, but nothing in the
/// client depends on that format: the id is compared and displayed, never
/// interpreted.
///
/// # Example
///
/// ```
/// use kasse_core::ProductId;
///
/// let id = ProductId::new("7d5f3a9e-0b1c-4e6d-8f2a-1c3b5d7e9f01");
/// assert_eq!(id.as_str(), "7d5f3a9e-0b1c-4e6d-8f2a-1c3b5d7e9f01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product id from a string value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
