//! Kasse Core - Shared types and checkout logic.
//!
//! This crate provides the domain core used by all Kasse components:
//! - `client` - Catalog source manager and its I/O collaborators
//! - `cli` - Terminal host shell
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and independently
//! testable: the cart ledger and the checkout state machine are functions
//! of the values handed to them.
//!
//! # Modules
//!
//! - [`types`] - Product ids, exact currency amounts, products and catalogs
//! - [`cart`] - The cart ledger: quantities, line items, grand total
//! - [`checkout`] - The checkout state machine: payment selection, cash
//!   tender, change, sale completion

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;

pub use cart::{Cart, CartError, LineItem};
pub use checkout::{
    CashTender, CheckoutError, CheckoutSession, CheckoutState, PaymentMethod, PaymentPolicy,
    SaleReceipt,
};
pub use types::*;
