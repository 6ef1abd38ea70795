//! Account domain model

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A bank account exposed through a linked requisition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub last_accessed_at: Option<DateTime<FixedOffset>>,
    pub iban: Option<String>,
    pub bban: Option<String>,
    pub status: Option<String>,
    pub institution_id: String,
    pub owner_name: Option<String>,
    pub display_name: Option<String>,
}

impl Account {
    /// Best human-readable label: display name, then IBAN, then BBAN, then id
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.iban.as_deref())
            .or(self.bban.as_deref())
            .unwrap_or(&self.id)
    }
}
