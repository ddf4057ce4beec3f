#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, sync::Mutex};

use cashbook_core::{
    config::ConfigManager,
    core::{
        book::CustomerBook,
        cache::StatsCache,
        time::{BusinessCalendar, ManualClock},
        tracker::IncomeTracker,
    },
    domain::{
        customer::{Customer, NewCustomer},
        transaction::{NewTransaction, Transaction, TransactionKind},
    },
    storage::MemoryStore,
};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;

pub const USER: &str = "user-1";

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub struct TestEnv {
    pub base: PathBuf,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub book: CustomerBook,
    pub tracker: IncomeTracker,
    pub config_manager: ConfigManager,
}

pub fn start_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

/// Creates an isolated environment backed by a unique directory for each test.
pub fn setup_test_env() -> TestEnv {
    setup_with_calendar(BusinessCalendar::utc())
}

/// Business day boundaries at UTC+05:30.
pub fn ist_calendar() -> BusinessCalendar {
    BusinessCalendar::new(FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("ist offset"))
}

pub fn setup_with_calendar(calendar: BusinessCalendar) -> TestEnv {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_instant()));
    let cache = Arc::new(StatsCache::new(Duration::minutes(5), clock.clone()));
    let book = CustomerBook::with_clock(store.clone(), calendar, clock.clone());
    let tracker = IncomeTracker::with_clock(store.clone(), cache, clock.clone());
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");

    TestEnv {
        base,
        store,
        clock,
        book,
        tracker,
        config_manager,
    }
}

impl TestEnv {
    pub fn customer(&self, name: &str, opening: Decimal) -> Customer {
        self.book
            .create_customer(
                USER,
                NewCustomer::new(name, "555-0100").with_opening_balance(opening),
            )
            .expect("create customer")
    }

    pub fn record(
        &self,
        customer: &Customer,
        kind: TransactionKind,
        amount: Decimal,
        date: DateTime<Utc>,
    ) -> Transaction {
        self.book
            .add_transaction(USER, NewTransaction::new(customer.id, kind, amount, date))
            .expect("record transaction")
    }
}
