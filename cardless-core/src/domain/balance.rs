//! Balance domain model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// A balance reported for an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub amount: Money,
    /// Balance kind as named by the bank (e.g. "expected", "interimAvailable")
    pub balance_type: String,
    pub reference_date: Option<NaiveDate>,
}
