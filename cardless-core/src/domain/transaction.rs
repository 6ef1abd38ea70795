//! Transaction domain model
//!
//! Banks report settled and not-yet-settled records in separate sections of
//! the transactions response. The section decides the variant; there is no
//! tag field in the payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Minimal reference to the other party's account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyAccount {
    pub iban: Option<String>,
}

/// Which side of the payment the counterparty fields were taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartyRole {
    /// The payer; used for money received
    Debtor,
    /// The payee; used for money sent
    Creditor,
}

/// Direction of a booked transaction, derived from the amount sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn of(amount: &Money) -> Self {
        if amount.is_positive() {
            Direction::Incoming
        } else {
            Direction::Outgoing
        }
    }

    pub fn counterparty_role(self) -> CounterpartyRole {
        match self {
            Direction::Incoming => CounterpartyRole::Debtor,
            Direction::Outgoing => CounterpartyRole::Creditor,
        }
    }
}

/// A settled transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedTransaction {
    pub transaction_id: String,
    pub counterparty_name: Option<String>,
    pub counterparty_account: Option<CounterpartyAccount>,
    pub counterparty_role: CounterpartyRole,
    pub amount: Money,
    pub booking_date: Option<NaiveDate>,
    pub value_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub additional_info: Option<String>,
}

impl BookedTransaction {
    pub fn direction(&self) -> Direction {
        Direction::of(&self.amount)
    }
}

/// A transaction the bank has not settled yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub amount: Money,
    pub value_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub additional_info: Option<String>,
}

/// Either kind of transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Transaction {
    Booked(BookedTransaction),
    Pending(PendingTransaction),
}

impl Transaction {
    pub fn amount(&self) -> &Money {
        match self {
            Transaction::Booked(tx) => &tx.amount,
            Transaction::Pending(tx) => &tx.amount,
        }
    }

    pub fn value_date(&self) -> Option<NaiveDate> {
        match self {
            Transaction::Booked(tx) => tx.value_date,
            Transaction::Pending(tx) => tx.value_date,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Transaction::Booked(tx) => tx.description.as_deref(),
            Transaction::Pending(tx) => tx.description.as_deref(),
        }
    }

    pub fn additional_info(&self) -> Option<&str> {
        match self {
            Transaction::Booked(tx) => tx.additional_info.as_deref(),
            Transaction::Pending(tx) => tx.additional_info.as_deref(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Transaction::Pending(_))
    }
}

/// Booked and pending transactions of one account, each in API order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsResult {
    pub booked: Vec<BookedTransaction>,
    pub pending: Vec<PendingTransaction>,
}

impl TransactionsResult {
    pub fn len(&self) -> usize {
        self.booked.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.booked.is_empty() && self.pending.is_empty()
    }

    /// All transactions, booked first
    pub fn iter(&self) -> impl Iterator<Item = Transaction> + '_ {
        self.booked
            .iter()
            .cloned()
            .map(Transaction::Booked)
            .chain(self.pending.iter().cloned().map(Transaction::Pending))
    }
}
