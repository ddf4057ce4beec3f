use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        common::{Identifiable, UserScoped},
        customer::Customer,
        income::{IncomeEntry, IncomeKey},
        transaction::Transaction,
    },
    errors::{LedgerError, Result},
};

use super::{IncomeStore, LedgerStore};

/// Everything a [`MemoryStore`] holds, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreState {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub income: Vec<IncomeEntry>,
}

/// In-process store used by tests, tools, and as a reference implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    pub fn snapshot(&self) -> StoreState {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn find_owned<T: Identifiable + UserScoped + Clone>(
    items: &[T],
    user_id: &str,
    id: Uuid,
) -> Option<T> {
    items
        .iter()
        .find(|item| item.id() == id && item.belongs_to(user_id))
        .cloned()
}

fn take_owned<T: Identifiable + UserScoped>(
    items: &mut Vec<T>,
    user_id: &str,
    id: Uuid,
) -> Option<T> {
    let position = items
        .iter()
        .position(|item| item.id() == id && item.belongs_to(user_id))?;
    Some(items.remove(position))
}

fn ensure_new<T: Identifiable>(items: &[T], record: &T, label: &str) -> Result<()> {
    if items.iter().any(|existing| existing.id() == record.id()) {
        return Err(LedgerError::StorageError(format!(
            "{} {} already exists",
            label,
            record.id()
        )));
    }
    Ok(())
}

impl LedgerStore for MemoryStore {
    fn customer(&self, user_id: &str, id: Uuid) -> Result<Option<Customer>> {
        Ok(find_owned(&self.read().customers, user_id, id))
    }

    fn customers(&self, user_id: &str) -> Result<Vec<Customer>> {
        Ok(self
            .read()
            .customers
            .iter()
            .filter(|customer| customer.belongs_to(user_id))
            .cloned()
            .collect())
    }

    fn insert_customer(&self, customer: Customer) -> Result<()> {
        let mut state = self.write();
        ensure_new(&state.customers, &customer, "customer")?;
        state.customers.push(customer);
        Ok(())
    }

    fn replace_customer(&self, customer: Customer) -> Result<()> {
        let mut state = self.write();
        let slot = state
            .customers
            .iter_mut()
            .find(|existing| existing.id == customer.id && existing.user_id == customer.user_id)
            .ok_or(LedgerError::CustomerNotFound(customer.id))?;
        *slot = customer;
        Ok(())
    }

    fn remove_customer(&self, user_id: &str, id: Uuid) -> Result<Option<Customer>> {
        Ok(take_owned(&mut self.write().customers, user_id, id))
    }

    fn update_customer_balance(
        &self,
        user_id: &str,
        id: Uuid,
        balance: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.write();
        let customer = state
            .customers
            .iter_mut()
            .find(|customer| customer.id == id && customer.belongs_to(user_id))
            .ok_or(LedgerError::CustomerNotFound(id))?;
        customer.current_balance = balance;
        customer.updated_at = updated_at;
        Ok(())
    }

    fn transaction(&self, user_id: &str, id: Uuid) -> Result<Option<Transaction>> {
        Ok(find_owned(&self.read().transactions, user_id, id))
    }

    fn transactions_for_customer(
        &self,
        user_id: &str,
        customer_id: Uuid,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .read()
            .transactions
            .iter()
            .filter(|txn| txn.customer_id == customer_id && txn.belongs_to(user_id))
            .cloned()
            .collect())
    }

    fn transactions_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .read()
            .transactions
            .iter()
            .filter(|txn| txn.belongs_to(user_id) && txn.date >= start && txn.date <= end)
            .cloned()
            .collect())
    }

    fn insert_transaction(&self, transaction: Transaction) -> Result<()> {
        let mut state = self.write();
        ensure_new(&state.transactions, &transaction, "transaction")?;
        state.transactions.push(transaction);
        Ok(())
    }

    fn remove_transaction(&self, user_id: &str, id: Uuid) -> Result<Option<Transaction>> {
        Ok(take_owned(&mut self.write().transactions, user_id, id))
    }
}

impl IncomeStore for MemoryStore {
    fn income_entry(&self, user_id: &str, id: Uuid) -> Result<Option<IncomeEntry>> {
        Ok(find_owned(&self.read().income, user_id, id))
    }

    fn income_for_year(&self, user_id: &str, year: i32) -> Result<Vec<IncomeEntry>> {
        Ok(self
            .read()
            .income
            .iter()
            .filter(|entry| entry.year == year && entry.belongs_to(user_id))
            .cloned()
            .collect())
    }

    fn find_income(&self, key: &IncomeKey) -> Result<Option<IncomeEntry>> {
        Ok(self
            .read()
            .income
            .iter()
            .find(|entry| &entry.key() == key)
            .cloned())
    }

    fn insert_income(&self, entry: IncomeEntry) -> Result<()> {
        let mut state = self.write();
        ensure_new(&state.income, &entry, "income entry")?;
        state.income.push(entry);
        Ok(())
    }

    fn replace_income(&self, entry: IncomeEntry) -> Result<()> {
        let mut state = self.write();
        let slot = state
            .income
            .iter_mut()
            .find(|existing| existing.id == entry.id && existing.user_id == entry.user_id)
            .ok_or(LedgerError::IncomeEntryNotFound(entry.id))?;
        *slot = entry;
        Ok(())
    }

    fn remove_income(&self, user_id: &str, id: Uuid) -> Result<Option<IncomeEntry>> {
        Ok(take_owned(&mut self.write().income, user_id, id))
    }
}
