//! Core types for Kasse.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod product;

pub use id::ProductId;
pub use money::{Money, MoneyError};
pub use product::{Catalog, Product};
