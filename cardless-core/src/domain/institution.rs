//! Institution domain model

use serde::{Deserialize, Serialize};

/// A bank that can be linked through a requisition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub bic: String,
    /// How many days of transaction history the bank exposes
    pub transaction_total_days: Option<u32>,
    pub max_access_valid_for_days: Option<u32>,
    pub logo_url: Option<String>,
    /// ISO 3166 country codes the institution serves
    pub countries: Vec<String>,
}
