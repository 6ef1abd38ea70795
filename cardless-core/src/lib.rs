//! Cardless Core - client for the GoCardless Bank Account Data API
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Core entities (Institution, Requisition, Account, Transaction, etc.)
//! - **ports**: Trait definitions for external dependencies (Transport)
//! - **services**: Credential store, request dispatcher, response decoders
//! - **adapters**: Concrete implementations (reqwest transport)
//!
//! [`CardlessClient`] is the entry point:
//!
//! ```no_run
//! use cardless_core::{CardlessClient, Config};
//!
//! let config = Config::from_env()?;
//! let client = CardlessClient::connect(&config)?;
//! for institution in client.institutions("GB")? {
//!     println!("{} {}", institution.id, institution.name);
//! }
//! # Ok::<(), cardless_core::Error>(())
//! ```

pub mod adapters;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types at crate root
pub use client::{CardlessClient, RequisitionPages};
pub use config::Config;
pub use domain::result::{ApiError, Error, Result};
pub use domain::{
    AccessGrant, Account, Balance, BookedTransaction, CounterpartyAccount, CounterpartyRole,
    Credential, Direction, Institution, Money, PendingTransaction, Requisition, RequisitionsPage,
    Transaction, TransactionsResult,
};
