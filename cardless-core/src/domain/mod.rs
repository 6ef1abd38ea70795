//! Core domain entities
//!
//! Immutable value objects decoded from API responses. No I/O here.

mod account;
mod balance;
pub mod credential;
mod institution;
pub mod money;
mod requisition;
pub mod result;
mod transaction;

pub use account::Account;
pub use balance::Balance;
pub use credential::{AccessGrant, Credential};
pub use institution::Institution;
pub use money::Money;
pub use requisition::{Requisition, RequisitionsPage};
pub use transaction::{
    BookedTransaction, CounterpartyAccount, CounterpartyRole, Direction, PendingTransaction,
    Transaction, TransactionsResult,
};
