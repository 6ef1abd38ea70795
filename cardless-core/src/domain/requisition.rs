//! Requisition domain model

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Consent session linking an end user's bank login to account access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requisition {
    pub id: String,
    pub created_at: DateTime<FixedOffset>,
    pub redirect_uri: String,
    /// Status code as reported by the API (e.g. "CR", "LN", "EX")
    pub status: String,
    pub institution_id: String,
    pub agreement_id: String,
    pub reference: String,
    /// Linked account ids, in API order
    pub account_ids: Vec<String>,
    /// URL the end user opens to grant consent
    pub consent_link: String,
}

impl Requisition {
    /// True once the end user has completed the bank login ("LN")
    pub fn is_linked(&self) -> bool {
        self.status == "LN"
    }
}

/// One page of a cursor-paginated requisition listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitionsPage {
    pub total_count: u64,
    /// Opaque URL of the next page; `None` on the last page
    pub next_page_token: Option<String>,
    /// Opaque URL of the previous page; `None` on the first page
    pub previous_page_token: Option<String>,
    pub items: Vec<Requisition>,
}

impl RequisitionsPage {
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }
}
