//! Money domain model

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An exact decimal amount in a given currency
///
/// Serializes the amount as a decimal string, keeping the scale the API sent
/// (`"12.30"` stays `"12.30"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    #[serde(rename = "currency")]
    pub currency_code: String,
    pub amount: Decimal,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            currency_code: currency_code.into(),
            amount,
        }
    }

    /// True for money received
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Sum of two amounts in the same currency
    ///
    /// Returns `None` when currencies differ or the sum overflows.
    pub fn checked_add(&self, other: &Money) -> Option<Money> {
        if self.currency_code != other.currency_code {
            return None;
        }
        let amount = self.amount.checked_add(other.amount)?;
        Some(Money::new(self.currency_code.clone(), amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency_code)
    }
}
