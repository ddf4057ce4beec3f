//! Ledger engine: replays a customer's transactions into running-balance rows.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::{
    customer::Customer,
    ledger::{BalanceAudit, LedgerEntry, LedgerRef, OPENING_BALANCE_LABEL},
    transaction::Transaction,
};

pub struct LedgerService;

impl LedgerService {
    /// Builds the chronological ledger for `customer`.
    ///
    /// Transactions are ordered by `date` with a stable sort, so rows sharing an
    /// instant keep the order they were fetched in. A non-zero opening balance
    /// adds a leading row dated at the customer's creation time.
    pub fn build_ledger(customer: &Customer, transactions: &[Transaction]) -> Vec<LedgerEntry> {
        let opening = customer.opening_balance;
        let mut entries = Vec::with_capacity(transactions.len() + 1);
        if !opening.is_zero() {
            entries.push(LedgerEntry {
                date: customer.created_at,
                description: OPENING_BALANCE_LABEL.to_string(),
                credit: opening.max(Decimal::ZERO),
                debit: (-opening).max(Decimal::ZERO),
                balance: opening,
                reference: LedgerRef::Opening,
            });
        }

        let mut running = opening;
        for txn in Self::chronological(transactions) {
            let credit = txn.credit_amount();
            let debit = txn.debit_amount();
            running += credit - debit;
            entries.push(LedgerEntry {
                date: txn.date,
                description: txn.display_description(),
                credit,
                debit,
                balance: running,
                reference: LedgerRef::Transaction(txn.id),
            });
        }
        debug!(
            customer_id = %customer.id,
            rows = entries.len(),
            "ledger built"
        );
        entries
    }

    /// The balance the customer should carry given its full history.
    pub fn recompute_balance(customer: &Customer, transactions: &[Transaction]) -> Decimal {
        transactions
            .iter()
            .fold(customer.opening_balance, |balance, txn| {
                balance + txn.signed_amount()
            })
    }

    /// Compares stored balances against a chronological replay.
    pub fn audit(customer: &Customer, transactions: &[Transaction]) -> BalanceAudit {
        let mut running = customer.opening_balance;
        let mut stale_snapshots = Vec::new();
        for txn in Self::chronological(transactions) {
            running += txn.signed_amount();
            if txn.balance_after != running {
                stale_snapshots.push(txn.id);
            }
        }
        let drift = running - customer.current_balance;
        if !drift.is_zero() {
            warn!(
                customer_id = %customer.id,
                stored = %customer.current_balance,
                recomputed = %running,
                "customer balance drifted from transaction history"
            );
        }
        BalanceAudit {
            customer_id: customer.id,
            stored_balance: customer.current_balance,
            recomputed_balance: running,
            drift,
            stale_snapshots,
        }
    }

    fn chronological(transactions: &[Transaction]) -> Vec<&Transaction> {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by_key(|txn| txn.date);
        ordered
    }
}
