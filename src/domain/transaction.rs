//! Money movements recorded against a single customer.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub customer_id: Uuid,
    /// Copied from the customer when the transaction is written.
    pub customer_name: String,
    /// Always positive; direction lives in `kind`.
    pub amount: Decimal,
    pub kind: TransactionKind,
    /// Business-effective date, distinct from `created_at`.
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub payment_method: PaymentMethod,
    /// Snapshot of the customer balance taken at write time. Not authoritative.
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Contribution of this transaction to the customer's running balance.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.apply(self.amount)
    }

    pub fn credit_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => Decimal::ZERO,
        }
    }

    pub fn debit_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Credit => Decimal::ZERO,
            TransactionKind::Debit => self.amount,
        }
    }

    /// Description for display, falling back to `"<kind> transaction"`.
    pub fn display_description(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => format!("{} transaction", self.kind),
        }
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl UserScoped for Transaction {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    /// Signs a positive amount: credits add, debits subtract.
    pub fn apply(self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Credit => amount,
            TransactionKind::Debit => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    BankTransfer,
    Upi,
    Other,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Other => "other",
        })
    }
}

/// Caller-supplied fields for a new transaction. The customer name, balance
/// snapshot, and timestamps are filled in by the write path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl NewTransaction {
    pub fn new(
        customer_id: Uuid,
        kind: TransactionKind,
        amount: Decimal,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_id,
            amount,
            kind,
            date,
            description: None,
            payment_method: PaymentMethod::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }
}
