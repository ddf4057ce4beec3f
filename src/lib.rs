#![doc(test(attr(deny(warnings))))]

//! Cashbook Core derives customer ledgers, period reports and income
//! statistics from raw transaction records, with a TTL cache in front of the
//! income read path and a compensating write path for ledger transactions.

pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod export;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Cashbook Core tracing initialized.");
    });
}
