use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Description used for the synthetic first row of a ledger.
pub const OPENING_BALANCE_LABEL: &str = "Opening Balance";

/// One computed row of a customer ledger. Derived on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub date: DateTime<Utc>,
    pub description: String,
    pub credit: Decimal,
    pub debit: Decimal,
    pub balance: Decimal,
    pub reference: LedgerRef,
}

impl LedgerEntry {
    pub fn is_opening(&self) -> bool {
        self.reference == LedgerRef::Opening
    }
}

/// Points a ledger row back at its source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerRef {
    Opening,
    Transaction(Uuid),
}

impl LedgerRef {
    pub fn transaction_id(&self) -> Option<Uuid> {
        match self {
            LedgerRef::Opening => None,
            LedgerRef::Transaction(id) => Some(*id),
        }
    }
}

impl fmt::Display for LedgerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerRef::Opening => f.write_str("opening"),
            LedgerRef::Transaction(id) => write!(f, "{}", id),
        }
    }
}

/// Comparison between a customer's stored balances and a full replay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceAudit {
    pub customer_id: Uuid,
    pub stored_balance: Decimal,
    pub recomputed_balance: Decimal,
    /// `recomputed_balance - stored_balance`.
    pub drift: Decimal,
    /// Transactions whose `balance_after` disagrees with the chronological replay.
    pub stale_snapshots: Vec<Uuid>,
}

impl BalanceAudit {
    pub fn has_drift(&self) -> bool {
        !self.drift.is_zero()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_drift() && self.stale_snapshots.is_empty()
    }
}
