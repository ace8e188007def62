//! Exact two-decimal currency amounts.
//!
//! Amounts are backed by [`rust_decimal::Decimal`] and normalized to two
//! decimal places on every construction and arithmetic result, so line
//! totals and change never pick up binary floating-point drift. The core
//! produces the numeric value only; attaching a localized currency label is
//! the shell's concern (a plain code prefix is available via
//! [`Money::display_with`]).

use core::fmt;
use core::ops::{Add, Sub};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`Money`] amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    /// The input string is not a decimal number.
    #[error("not a valid amount: {0:?}")]
    Unparseable(String),
    /// The input is a valid decimal but negative.
    #[error("amount must not be negative: {0:?}")]
    Negative(String),
}

/// A currency amount with exactly two decimal places.
///
/// Negative values are representable (change due on an undertendered sale
/// is negative), but [`Money::parse`] rejects them because it only accepts
/// customer-facing input such as a tendered amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Create an amount from a decimal, rounding to two places
    /// (midpoint away from zero).
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        Self(rounded)
    }

    /// The zero amount.
    #[must_use]
    pub fn zero() -> Self {
        Self::from_minor_units(0)
    }

    /// Create an amount from minor units (e.g. 1250 -> 12.50).
    #[must_use]
    pub fn from_minor_units(units: i64) -> Self {
        Self(Decimal::new(units, 2))
    }

    /// Parse a non-negative amount from user input.
    ///
    /// Accepts plain decimal forms such as `"30"`, `"30.5"`, or `"30.50"`;
    /// surrounding whitespace is ignored. More than two decimal places are
    /// rounded.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Unparseable`] if the input is not a decimal
    /// number and [`MoneyError::Negative`] if it is negative.
    pub fn parse(raw: &str) -> Result<Self, MoneyError> {
        let trimmed = raw.trim();
        let amount = Decimal::from_str(trimmed)
            .map_err(|_| MoneyError::Unparseable(raw.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(raw.to_owned()));
        }
        Ok(Self::new(amount))
    }

    /// The underlying decimal value (scale 2).
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a quantity, rounding the result to two places.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Render with a literal currency-code prefix, e.g. `CHF 12.50`.
    #[must_use]
    pub fn display_with(&self, code: &str) -> String {
        format!("{code} {self}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Scale is pinned to 2 in every constructor.
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.0 - rhs.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Product feeds carry prices as JSON numbers; a negative price is a
        // malformed feed, not a representable amount.
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(D::Error::custom("amount must not be negative"));
        }
        Ok(Self::new(amount))
    }
}
