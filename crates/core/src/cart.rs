//! The cart ledger.
//!
//! A cart is a mapping of product id to quantity. It never stores product
//! data: line items and the grand total are derived on demand from the cart
//! and a catalog, so the ledger is a pure function of its two inputs and the
//! same cart can be re-priced against a freshly swapped catalog.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::types::{Catalog, Money, Product, ProductId};

/// Errors that can occur when pricing a cart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// A cart entry references a product the catalog does not contain.
    ///
    /// This indicates a stale cart referencing a catalog that has since
    /// been swapped; it is surfaced rather than silently skipped.
    #[error("unknown product in cart: {0}")]
    UnknownProduct(ProductId),
}

/// A priced cart line, derived from a cart and a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    /// The catalog product this line refers to.
    pub product: &'a Product,
    /// Units of the product in the cart.
    pub quantity: u32,
    /// `quantity * price`, rounded to two decimal places.
    pub line_total: Money,
}

/// Quantities of products selected for the current sale.
///
/// Keys are unique; quantities are at least 1 (removing the last unit drops
/// the entry). Insertion order is irrelevant to totals; display order comes
/// from the catalog via [`Cart::line_items`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: BTreeMap<ProductId, u32>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a product. Returns the new quantity.
    pub fn add(&mut self, id: ProductId) -> u32 {
        self.add_many(id, 1)
    }

    /// Add `units` of a product. Returns the resulting quantity.
    ///
    /// Adding zero units leaves the cart unchanged.
    pub fn add_many(&mut self, id: ProductId, units: u32) -> u32 {
        if units == 0 {
            return self.quantity(&id);
        }
        let quantity = self.entries.entry(id).or_insert(0);
        *quantity = quantity.saturating_add(units);
        *quantity
    }

    /// Remove one unit of a product. Returns the remaining quantity.
    ///
    /// The entry is dropped when the last unit is removed; removing a
    /// product that is not in the cart is a no-op.
    pub fn remove(&mut self, id: &ProductId) -> u32 {
        match self.entries.entry(id.clone()) {
            Entry::Occupied(mut occupied) => {
                let quantity = occupied.get_mut();
                *quantity -= 1;
                if *quantity == 0 {
                    occupied.remove();
                    0
                } else {
                    *quantity
                }
            }
            Entry::Vacant(_) => 0,
        }
    }

    /// Remove a product entirely, whatever its quantity.
    pub fn remove_all(&mut self, id: &ProductId) {
        self.entries.remove(id);
    }

    /// Empty the cart. Called by the shell once a sale has finished.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Quantity of a product in the cart (0 if absent).
    #[must_use]
    pub fn quantity(&self, id: &ProductId) -> u32 {
        self.entries.get(id).copied().unwrap_or(0)
    }

    /// Whether the cart holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.entries.values().fold(0, |sum, q| sum.saturating_add(*q))
    }

    /// The grand total of the cart priced against `catalog`.
    ///
    /// Each line is rounded to two decimal places before summation and the
    /// sum is rounded again. Invariant under catalog reordering.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] if any entry references a
    /// product the catalog does not contain.
    pub fn total(&self, catalog: &Catalog) -> Result<Money, CartError> {
        let mut sum = Money::zero();
        for (id, quantity) in &self.entries {
            let product = catalog
                .get(id)
                .ok_or_else(|| CartError::UnknownProduct(id.clone()))?;
            sum = sum + product.price.times(*quantity);
        }
        Ok(sum)
    }

    /// Priced cart lines in catalog order.
    ///
    /// The sequence order is the catalog order filtered to cart membership,
    /// which keeps display output deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownProduct`] if any entry references a
    /// product the catalog does not contain.
    pub fn line_items<'a>(&self, catalog: &'a Catalog) -> Result<Vec<LineItem<'a>>, CartError> {
        for id in self.entries.keys() {
            if !catalog.contains(id) {
                return Err(CartError::UnknownProduct(id.clone()));
            }
        }
        let items = catalog
            .iter()
            .filter_map(|product| {
                self.entries.get(&product.id).map(|&quantity| LineItem {
                    product,
                    quantity,
                    line_total: product.price.times(quantity),
                })
            })
            .collect();
        Ok(items)
    }
}
