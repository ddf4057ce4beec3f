//! Seams to the document store that owns persistence.
//!
//! Implementations are responsible for scoping every read and write to the
//! calling user; the services never see another user's records.

pub mod json_backend;
pub mod memory;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    domain::{
        customer::Customer,
        income::{IncomeEntry, IncomeKey},
        transaction::Transaction,
    },
    errors::Result,
};

pub use json_backend::{load_snapshot, save_snapshot, SNAPSHOT_SCHEMA_VERSION};
pub use memory::MemoryStore;

/// Customer and transaction persistence for the ledger side.
pub trait LedgerStore: Send + Sync {
    fn customer(&self, user_id: &str, id: Uuid) -> Result<Option<Customer>>;
    fn customers(&self, user_id: &str) -> Result<Vec<Customer>>;
    fn insert_customer(&self, customer: Customer) -> Result<()>;
    fn replace_customer(&self, customer: Customer) -> Result<()>;
    fn remove_customer(&self, user_id: &str, id: Uuid) -> Result<Option<Customer>>;
    fn update_customer_balance(
        &self,
        user_id: &str,
        id: Uuid,
        balance: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;

    fn transaction(&self, user_id: &str, id: Uuid) -> Result<Option<Transaction>>;
    /// All of one customer's transactions, in whatever order the store keeps them.
    fn transactions_for_customer(&self, user_id: &str, customer_id: Uuid)
        -> Result<Vec<Transaction>>;
    /// Transactions dated within `[start, end]`, both ends inclusive.
    fn transactions_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>>;
    fn insert_transaction(&self, transaction: Transaction) -> Result<()>;
    fn remove_transaction(&self, user_id: &str, id: Uuid) -> Result<Option<Transaction>>;
}

/// Persistence for the income tracker.
pub trait IncomeStore: Send + Sync {
    fn income_entry(&self, user_id: &str, id: Uuid) -> Result<Option<IncomeEntry>>;
    fn income_for_year(&self, user_id: &str, year: i32) -> Result<Vec<IncomeEntry>>;
    /// The record holding `key`, if one exists.
    fn find_income(&self, key: &IncomeKey) -> Result<Option<IncomeEntry>>;
    fn insert_income(&self, entry: IncomeEntry) -> Result<()>;
    fn replace_income(&self, entry: IncomeEntry) -> Result<()>;
    fn remove_income(&self, user_id: &str, id: Uuid) -> Result<Option<IncomeEntry>>;
}
