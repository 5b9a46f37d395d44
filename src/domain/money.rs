use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest amount accepted for a single expense or income.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// A signed running total, written to disk as an exact JSON number.
///
/// This is a wrapper around `rust_decimal::Decimal` so balance arithmetic never
/// goes through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(#[serde(with = "rust_decimal::serde::arbitrary_precision")] pub Decimal);

/// A strictly positive amount, at most [`MAX_AMOUNT`], entered by the user for
/// one expense or income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(#[serde(with = "rust_decimal::serde::arbitrary_precision")] Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO && value <= Decimal::from(MAX_AMOUNT) {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(value.to_string()))
        }
    }

    /// Parses free text typed by the user, e.g. `"150"`, `" 12.50 "` or `"1e3"`.
    pub fn parse(text: &str) -> Result<Self, LedgerError> {
        let trimmed = text.trim();
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| LedgerError::InvalidAmount(trimmed.to_string()))?;
        Self::new(value).map_err(|_| LedgerError::InvalidAmount(trimmed.to_string()))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// `None` if the result does not fit in a `Decimal`.
    pub fn checked_add(self, amount: Amount) -> Option<Self> {
        self.0.checked_add(amount.0).map(Self)
    }

    /// `None` if the result does not fit in a `Decimal`.
    pub fn checked_sub(self, amount: Amount) -> Option<Self> {
        self.0.checked_sub(amount.0).map(Self)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
