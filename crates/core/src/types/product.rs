//! Products and the active catalog.

use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId};

/// A purchasable product.
///
/// Immutable once fetched: the catalog source manager owns the products and
/// the cart ledger only ever references them by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Opaque unique identifier from the feed.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price, two decimal places.
    pub price: Money,
}

/// The ordered list of purchasable products currently in effect.
///
/// Order is the feed order; it determines the display order of cart line
/// items. Lookups are by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog from an ordered product list.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    /// Whether a product with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate products in feed order.
    pub fn iter(&self) -> core::slice::Iter<'_, Product> {
        self.products.iter()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = core::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}
