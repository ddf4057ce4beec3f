//! Customer book: the ledger write path and fetch-driven read operations.
//!
//! Recording or deleting a transaction touches two records, the transaction
//! itself and the customer's denormalized `current_balance`. The book runs
//! these as a two-step saga: when the balance write fails the first step is
//! undone, and if the undo also fails the caller gets
//! [`LedgerError::PartialWrite`] so a later [`CustomerBook::reconcile`] can
//! repair the balance from history.
//!
//! Every write that reads a balance and writes a new one runs under the
//! book's write lock, so concurrent callers sharing one book cannot lose
//! each other's balance updates.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    core::{
        services::{CustomerService, LedgerService, ReportService},
        time::{BusinessCalendar, Clock, SystemClock},
    },
    domain::{
        customer::{Customer, CustomerPatch, NewCustomer},
        income::Month,
        ledger::{BalanceAudit, LedgerEntry},
        report::{ReceivableSummary, Report, ReportPeriod},
        transaction::{NewTransaction, Transaction},
    },
    errors::{LedgerError, Result},
    storage::LedgerStore,
};

pub struct CustomerBook {
    store: Arc<dyn LedgerStore>,
    calendar: BusinessCalendar,
    clock: Arc<dyn Clock>,
    writes: Mutex<()>,
}

impl CustomerBook {
    pub fn new(store: Arc<dyn LedgerStore>, calendar: BusinessCalendar) -> Self {
        Self::with_clock(store, calendar, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn LedgerStore>,
        calendar: BusinessCalendar,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            calendar,
            clock,
            writes: Mutex::new(()),
        }
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    pub fn customer(&self, user_id: &str, customer_id: Uuid) -> Result<Customer> {
        self.store
            .customer(user_id, customer_id)?
            .ok_or(LedgerError::CustomerNotFound(customer_id))
    }

    pub fn customers(&self, user_id: &str) -> Result<Vec<Customer>> {
        self.store.customers(user_id)
    }

    pub fn create_customer(&self, user_id: &str, new_customer: NewCustomer) -> Result<Customer> {
        CustomerService::validate_new(&new_customer)?;
        let mut customer = Customer::new(
            user_id,
            new_customer.name.trim(),
            new_customer.phone.trim(),
            new_customer.opening_balance,
            self.clock.now(),
        );
        customer.email = new_customer.email;
        customer.address = new_customer.address;
        self.store.insert_customer(customer.clone())?;
        info!(customer_id = %customer.id, opening = %customer.opening_balance, "customer created");
        Ok(customer)
    }

    /// Applies a contact or status patch. Balances cannot be edited here.
    pub fn update_customer(
        &self,
        user_id: &str,
        customer_id: Uuid,
        patch: CustomerPatch,
    ) -> Result<Customer> {
        CustomerService::validate_patch(&patch)?;
        let mut customer = self.customer(user_id, customer_id)?;
        customer.apply_patch(patch, self.clock.now());
        self.store.replace_customer(customer.clone())?;
        info!(customer_id = %customer.id, "customer updated");
        Ok(customer)
    }

    /// Removes the customer and every transaction recorded against them.
    ///
    /// Returns how many transactions were removed along with the customer.
    /// A failure after the first removal is a [`LedgerError::PartialWrite`]:
    /// the customer survives with part of their history gone.
    pub fn delete_customer(&self, user_id: &str, customer_id: Uuid) -> Result<usize> {
        let _guard = self.write_guard();
        let customer = self.customer(user_id, customer_id)?;
        let transactions = self.store.transactions_for_customer(user_id, customer_id)?;
        let mut removed = 0;
        for txn in &transactions {
            if let Err(err) = self.store.remove_transaction(user_id, txn.id) {
                return Err(cascade_failure(customer.id, removed, transactions.len(), err));
            }
            removed += 1;
        }
        if let Err(err) = self.store.remove_customer(user_id, customer.id) {
            return Err(cascade_failure(customer.id, removed, transactions.len(), err));
        }
        info!(
            customer_id = %customer.id,
            transactions = transactions.len(),
            "customer deleted with transaction history"
        );
        Ok(transactions.len())
    }

    /// Records a transaction and moves the customer's balance by its signed amount.
    pub fn add_transaction(&self, user_id: &str, new_txn: NewTransaction) -> Result<Transaction> {
        CustomerService::validate_transaction(&new_txn)?;
        let _guard = self.write_guard();
        let customer = self.customer(user_id, new_txn.customer_id)?;
        let now = self.clock.now();

        let mut transaction = Transaction {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            amount: new_txn.amount,
            kind: new_txn.kind,
            date: new_txn.date,
            description: new_txn
                .description
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            payment_method: new_txn.payment_method,
            balance_after: Decimal::ZERO,
            created_at: now,
        };
        let new_balance = CustomerService::balance_after_adding(customer.current_balance, &transaction);
        transaction.balance_after = new_balance;

        self.store.insert_transaction(transaction.clone())?;
        if let Err(err) =
            self.store
                .update_customer_balance(user_id, customer.id, new_balance, now)
        {
            warn!(
                transaction_id = %transaction.id,
                error = %err,
                "balance update failed; removing recorded transaction"
            );
            return match self.store.remove_transaction(user_id, transaction.id) {
                Ok(_) => Err(err),
                Err(undo) => {
                    error!(
                        transaction_id = %transaction.id,
                        customer_id = %customer.id,
                        error = %undo,
                        "compensation failed; customer balance is stale"
                    );
                    Err(LedgerError::PartialWrite(format!(
                        "transaction {} stored but balance not applied: {}",
                        transaction.id, err
                    )))
                }
            };
        }

        info!(
            transaction_id = %transaction.id,
            customer_id = %customer.id,
            kind = %transaction.kind,
            amount = %transaction.amount,
            balance = %new_balance,
            "transaction recorded"
        );
        Ok(transaction)
    }

    /// Deletes a transaction and reverses exactly what adding it applied.
    pub fn delete_transaction(&self, user_id: &str, transaction_id: Uuid) -> Result<Transaction> {
        let _guard = self.write_guard();
        let transaction = self
            .store
            .transaction(user_id, transaction_id)?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;
        let customer = self.customer(user_id, transaction.customer_id)?;
        let new_balance =
            CustomerService::balance_after_removing(customer.current_balance, &transaction);
        let now = self.clock.now();

        self.store.remove_transaction(user_id, transaction.id)?;
        if let Err(err) =
            self.store
                .update_customer_balance(user_id, customer.id, new_balance, now)
        {
            warn!(
                transaction_id = %transaction.id,
                error = %err,
                "balance reversal failed; restoring transaction"
            );
            return match self.store.insert_transaction(transaction.clone()) {
                Ok(()) => Err(err),
                Err(undo) => {
                    error!(
                        transaction_id = %transaction.id,
                        customer_id = %customer.id,
                        error = %undo,
                        "compensation failed; customer balance is stale"
                    );
                    Err(LedgerError::PartialWrite(format!(
                        "transaction {} removed but balance not reversed: {}",
                        transaction.id, err
                    )))
                }
            };
        }

        info!(
            transaction_id = %transaction.id,
            customer_id = %customer.id,
            balance = %new_balance,
            "transaction deleted"
        );
        Ok(transaction)
    }

    pub fn ledger(&self, user_id: &str, customer_id: Uuid) -> Result<Vec<LedgerEntry>> {
        let customer = self.customer(user_id, customer_id)?;
        let transactions = self.store.transactions_for_customer(user_id, customer_id)?;
        Ok(LedgerService::build_ledger(&customer, &transactions))
    }

    pub fn audit(&self, user_id: &str, customer_id: Uuid) -> Result<BalanceAudit> {
        let customer = self.customer(user_id, customer_id)?;
        let transactions = self.store.transactions_for_customer(user_id, customer_id)?;
        Ok(LedgerService::audit(&customer, &transactions))
    }

    /// Rewrites `current_balance` from the transaction history when it drifted.
    ///
    /// Per-transaction `balance_after` snapshots are reported but left untouched.
    pub fn reconcile(&self, user_id: &str, customer_id: Uuid) -> Result<BalanceAudit> {
        let _guard = self.write_guard();
        let audit = self.audit(user_id, customer_id)?;
        if audit.has_drift() {
            self.store.update_customer_balance(
                user_id,
                customer_id,
                audit.recomputed_balance,
                self.clock.now(),
            )?;
            info!(
                customer_id = %customer_id,
                from = %audit.stored_balance,
                to = %audit.recomputed_balance,
                "customer balance reconciled"
            );
        }
        Ok(audit)
    }

    pub fn report(&self, user_id: &str, period: ReportPeriod) -> Result<Report> {
        let (start, end) = self.calendar.bounds(&period)?;
        let transactions = self.store.transactions_between(user_id, start, end)?;
        let customers = self.store.customers(user_id)?;
        Ok(ReportService::aggregate(
            &transactions,
            period,
            &self.calendar,
            Some(&customers),
        ))
    }

    pub fn daily_report(&self, user_id: &str, date: NaiveDate) -> Result<Report> {
        self.report(user_id, ReportPeriod::day(date))
    }

    pub fn today_report(&self, user_id: &str) -> Result<Report> {
        self.daily_report(user_id, self.calendar.today(self.clock.as_ref()))
    }

    pub fn monthly_report(&self, user_id: &str, year: i32, month: Month) -> Result<Report> {
        self.report(user_id, ReportPeriod::month(year, month)?)
    }

    pub fn range_report(&self, user_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Report> {
        self.report(user_id, ReportPeriod::range(start, end)?)
    }

    pub fn receivables(&self, user_id: &str) -> Result<ReceivableSummary> {
        Ok(CustomerService::rollup(&self.store.customers(user_id)?))
    }

    pub fn reminders(&self, user_id: &str) -> Result<Vec<Customer>> {
        Ok(CustomerService::reminders(&self.store.customers(user_id)?))
    }
}

fn cascade_failure(
    customer_id: Uuid,
    removed: usize,
    total: usize,
    err: LedgerError,
) -> LedgerError {
    if removed == 0 {
        return err;
    }
    error!(
        customer_id = %customer_id,
        removed,
        total,
        error = %err,
        "customer delete stopped part way"
    );
    LedgerError::PartialWrite(format!(
        "customer {} delete removed {} of {} transactions: {}",
        customer_id, removed, total, err
    ))
}
