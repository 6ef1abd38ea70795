//! Public client facade
//!
//! One method per API capability. Each call goes through the dispatcher
//! (which refreshes the access token when it is about to expire) and one
//! decoder, and wraps any failure with the operation it belongs to.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use tracing::debug;
use url::Url;

use crate::adapters::http::ReqwestTransport;
use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, Balance, Credential, Institution, Requisition, RequisitionsPage, TransactionsResult,
};
use crate::ports::{Method, Transport};
use crate::services::decoder;
use crate::services::{Auth, CredentialStore, Dispatcher};

const INSTITUTIONS_PATH: &str = "institutions/";
const REQUISITIONS_PATH: &str = "requisitions/";
const ACCOUNTS_PATH: &str = "accounts/";

/// Bank account data API client
///
/// Safe to share between threads (`&CardlessClient` is `Sync`); concurrent
/// calls share one credential and trigger at most one refresh per expiry.
pub struct CardlessClient {
    dispatcher: Dispatcher,
    credentials: CredentialStore,
}

impl CardlessClient {
    /// Connect over HTTPS and exchange the secret pair for a credential
    pub fn connect(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(config.timeout)
            .map_err(|e| e.in_operation("Error in creating cardless client"))?;
        Self::with_transport(Arc::new(transport), config)
    }

    /// Build a client over any transport (mock servers, recorded fixtures)
    pub fn with_transport(transport: Arc<dyn Transport>, config: &Config) -> Result<Self> {
        let dispatcher = Dispatcher::new(transport, &config.base_url);
        debug!(base_url = dispatcher.base_url(), "Creating client");
        let credential = dispatcher
            .exchange_secret(&config.secret_id, &config.secret_key)
            .map_err(|e| e.in_operation("Error in creating cardless client"))?;

        Ok(Self {
            dispatcher,
            credentials: CredentialStore::new(credential),
        })
    }

    /// Snapshot of the credential currently in use
    pub fn credential(&self) -> Arc<Credential> {
        self.credentials.get()
    }

    pub fn base_url(&self) -> &str {
        self.dispatcher.base_url()
    }

    fn auth(&self) -> Auth<'_> {
        Auth::Bearer(&self.credentials)
    }

    /// List the institutions available in a country (ISO 3166 two-letter code)
    pub fn institutions(&self, country: &str) -> Result<Vec<Institution>> {
        debug!(country, "Fetching institutions");
        self.fetch_institutions(country).map_err(|e| {
            e.in_operation(format!("Error fetching institutions for country '{}'", country))
        })
    }

    pub fn institution(&self, id: &str) -> Result<Institution> {
        debug!(id, "Fetching institution");
        self.fetch_resource(INSTITUTIONS_PATH, id, "")
            .and_then(|json| decoder::institution(&json))
            .map_err(|e| e.in_operation(format!("Error fetching institution '{}'", id)))
    }

    /// One page of requisitions
    pub fn requisitions(&self, limit: u32, offset: u32) -> Result<RequisitionsPage> {
        debug!(limit, offset, "Fetching requisitions");
        self.fetch_requisitions(limit, offset)
            .map_err(|e| e.in_operation("Error fetching requisitions"))
    }

    /// Follow a `next_page_token` or `previous_page_token`
    pub fn requisitions_page(&self, token: &str) -> Result<RequisitionsPage> {
        debug!(token, "Fetching requisitions page");
        self.fetch_requisitions_page(token)
            .map_err(|e| e.in_operation("Error fetching requisitions page"))
    }

    /// Iterate over every requisitions page, `limit` items at a time
    pub fn requisition_pages(&self, limit: u32) -> RequisitionPages<'_> {
        RequisitionPages {
            client: self,
            cursor: Some(PageCursor::First { limit }),
        }
    }

    pub fn requisition(&self, id: &str) -> Result<Requisition> {
        debug!(id, "Fetching requisition");
        self.fetch_resource(REQUISITIONS_PATH, id, "")
            .and_then(|json| decoder::requisition(&json))
            .map_err(|e| e.in_operation(format!("Error fetching requisition '{}'", id)))
    }

    /// Start a bank linking flow; the end user follows `consent_link`
    pub fn create_requisition(&self, institution_id: &str, redirect: &Url) -> Result<Requisition> {
        debug!(institution_id, redirect = %redirect, "Creating requisition");
        self.post_requisition(institution_id, redirect).map_err(|e| {
            e.in_operation(format!(
                "Error creating requisition for institution '{}'",
                institution_id
            ))
        })
    }

    pub fn delete_requisition(&self, id: &str) -> Result<()> {
        debug!(id, "Deleting requisition");
        self.dispatcher
            .resource_url(REQUISITIONS_PATH, id, "")
            .and_then(|url| self.dispatcher.send(Method::Delete, url, None, self.auth()))
            .map(|_| ())
            .map_err(|e| e.in_operation(format!("Error deleting requisition '{}'", id)))
    }

    pub fn account(&self, id: &str) -> Result<Account> {
        debug!(id, "Fetching account");
        self.fetch_resource(ACCOUNTS_PATH, id, "")
            .and_then(|json| decoder::account(&json))
            .map_err(|e| e.in_operation(format!("Error fetching account '{}'", id)))
    }

    pub fn balances(&self, account_id: &str) -> Result<Vec<Balance>> {
        debug!(account_id, "Fetching balances");
        self.fetch_resource(ACCOUNTS_PATH, account_id, "balances/")
            .and_then(|json| decoder::balances(&json))
            .map_err(|e| {
                e.in_operation(format!("Error fetching balances for account '{}'", account_id))
            })
    }

    pub fn transactions(&self, account_id: &str) -> Result<TransactionsResult> {
        debug!(account_id, "Fetching transactions");
        let transactions = self
            .fetch_resource(ACCOUNTS_PATH, account_id, "transactions/")
            .and_then(|json| decoder::transactions(&json))
            .map_err(|e| {
                e.in_operation(format!(
                    "Error fetching transactions for account '{}'",
                    account_id
                ))
            })?;
        debug!(
            account_id,
            booked = transactions.booked.len(),
            pending = transactions.pending.len(),
            "Fetched transactions"
        );
        Ok(transactions)
    }

    /// GET `{prefix}{id}/{suffix}` with the bearer token
    fn fetch_resource(&self, prefix: &str, id: &str, suffix: &str) -> Result<JsonValue> {
        let url = self.dispatcher.resource_url(prefix, id, suffix)?;
        self.dispatcher.get_json(url, self.auth())
    }

    fn fetch_institutions(&self, country: &str) -> Result<Vec<Institution>> {
        if country.trim().is_empty() {
            return Err(Error::validation("Country code cannot be empty"));
        }
        let url = self
            .dispatcher
            .url(INSTITUTIONS_PATH, &[("country", country.trim())])?;
        let json = self.dispatcher.get_json(url, self.auth())?;
        decoder::institutions(&json)
    }

    fn fetch_requisitions(&self, limit: u32, offset: u32) -> Result<RequisitionsPage> {
        let limit = limit.to_string();
        let offset = offset.to_string();
        let url = self.dispatcher.url(
            REQUISITIONS_PATH,
            &[("limit", limit.as_str()), ("offset", offset.as_str())],
        )?;
        let json = self.dispatcher.get_json(url, self.auth())?;
        decoder::requisitions_page(&json)
    }

    fn fetch_requisitions_page(&self, token: &str) -> Result<RequisitionsPage> {
        let url = self.dispatcher.page_url(token)?;
        let json = self.dispatcher.get_json(url, self.auth())?;
        decoder::requisitions_page(&json)
    }

    fn post_requisition(&self, institution_id: &str, redirect: &Url) -> Result<Requisition> {
        if institution_id.trim().is_empty() {
            return Err(Error::validation("Institution id cannot be empty"));
        }
        let body = json!({
            "redirect": redirect.as_str(),
            "institution_id": institution_id,
        });
        let url = self.dispatcher.url(REQUISITIONS_PATH, &[])?;
        let json = self.dispatcher.post_json(url, &body, self.auth())?;
        decoder::requisition(&json)
    }
}

enum PageCursor {
    First { limit: u32 },
    Token(String),
}

/// Iterator returned by [`CardlessClient::requisition_pages`]
///
/// Ends after the last page, or after yielding the first error.
pub struct RequisitionPages<'a> {
    client: &'a CardlessClient,
    cursor: Option<PageCursor>,
}

impl Iterator for RequisitionPages<'_> {
    type Item = Result<RequisitionsPage>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = match self.cursor.take()? {
            PageCursor::First { limit } => self.client.requisitions(limit, 0),
            PageCursor::Token(token) => self.client.requisitions_page(&token),
        };
        if let Ok(page) = &result {
            self.cursor = page.next_page_token.clone().map(PageCursor::Token);
        }
        Some(result)
    }
}
