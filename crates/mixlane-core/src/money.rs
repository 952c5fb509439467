//! # Money — Integer-Cents Amounts
//!
//! Monetary values are stored as whole cents in a `u64`. Amounts in this
//! engine are only ever compared, summed, and tested for zero — none of
//! which tolerates float rounding. A milestone that should gate on
//! `amount > 0` must not wobble at `0.004999`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A non-negative monetary amount in whole cents.
///
/// The currency is a property of the project in the host system; the
/// engine never mixes amounts across projects, so no currency tag is
/// carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from whole cents.
    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Create an amount from whole dollars (no fractional part).
    pub fn from_dollars(dollars: u64) -> Self {
        Self(dollars * 100)
    }

    /// The amount in whole cents.
    pub fn cents(&self) -> u64 {
        self.0
    }

    /// Whether this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition, for summing milestone amounts against a budget.
    pub fn checked_add(&self, other: Amount) -> Result<Amount, CoreError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| CoreError::AmountOverflow(format!("{self} + {other}")))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl std::iter::Sum<Amount> for Result<Amount, CoreError> {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Ok(Amount::ZERO), |acc, x| acc?.checked_add(x))
    }
}
