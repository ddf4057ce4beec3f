mod common;

use cashbook_core::{
    core::services::LedgerService,
    domain::{
        ledger::{LedgerRef, OPENING_BALANCE_LABEL},
        transaction::{NewTransaction, TransactionKind},
    },
    errors::LedgerError,
    storage::LedgerStore,
};
use chrono::Duration;
use common::{setup_test_env, start_instant, USER};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::thread;
use uuid::Uuid;

#[test]
fn ledger_replays_opening_then_transactions() {
    let env = setup_test_env();
    let customer = env.customer("Ravi", dec!(500));
    let t = start_instant();
    env.record(&customer, TransactionKind::Debit, dec!(100), t + Duration::days(2));
    env.record(&customer, TransactionKind::Credit, dec!(300), t + Duration::days(1));

    let ledger = env.book.ledger(USER, customer.id).expect("ledger");
    let balances: Vec<Decimal> = ledger.iter().map(|row| row.balance).collect();
    assert_eq!(balances, vec![dec!(500), dec!(800), dec!(700)]);
    assert_eq!(ledger[0].description, OPENING_BALANCE_LABEL);
    assert_eq!(ledger[0].reference, LedgerRef::Opening);
    assert_eq!(ledger[1].credit, dec!(300));
    assert_eq!(ledger[2].debit, dec!(100));

    let stored = env.book.customer(USER, customer.id).expect("customer");
    assert_eq!(stored.current_balance, dec!(700));
    assert_eq!(ledger.last().map(|row| row.balance), Some(stored.current_balance));
}

#[test]
fn zero_opening_balance_has_no_synthetic_row() {
    let env = setup_test_env();
    let customer = env.customer("Meena", Decimal::ZERO);
    env.record(&customer, TransactionKind::Debit, dec!(40), start_instant());
    let ledger = env.book.ledger(USER, customer.id).expect("ledger");
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].balance, dec!(-40));
    assert!(!ledger[0].is_opening());
}

#[test]
fn final_ledger_balance_matches_stored_balance_after_many_writes() {
    let env = setup_test_env();
    let customer = env.customer("Bulk", dec!(12.34));
    let mut ids = Vec::new();
    for step in 0..200i64 {
        let kind = if step % 3 == 0 {
            TransactionKind::Debit
        } else {
            TransactionKind::Credit
        };
        let amount = Decimal::new(step * 7 + 1, 2);
        let txn = env.record(&customer, kind, amount, start_instant() + Duration::minutes(step));
        ids.push(txn.id);
    }
    for id in ids.iter().step_by(5) {
        env.book.delete_transaction(USER, *id).expect("delete");
    }

    let ledger = env.book.ledger(USER, customer.id).expect("ledger");
    let stored = env.book.customer(USER, customer.id).expect("customer");
    let transactions = env
        .store
        .transactions_for_customer(USER, customer.id)
        .expect("transactions");
    assert_eq!(ledger.last().map(|row| row.balance), Some(stored.current_balance));
    assert_eq!(
        LedgerService::recompute_balance(&stored, &transactions),
        stored.current_balance
    );
}

#[test]
fn deleting_every_transaction_returns_to_opening_balance() {
    let env = setup_test_env();
    let customer = env.customer("Round", dec!(-75));
    let a = env.record(&customer, TransactionKind::Credit, dec!(0.10), start_instant());
    let b = env.record(&customer, TransactionKind::Debit, dec!(0.20), start_instant());
    env.book.delete_transaction(USER, b.id).expect("delete b");
    env.book.delete_transaction(USER, a.id).expect("delete a");
    let stored = env.book.customer(USER, customer.id).expect("customer");
    assert_eq!(stored.current_balance, dec!(-75));
}

#[test]
fn backdated_transaction_leaves_stale_snapshots_for_audit() {
    let env = setup_test_env();
    let customer = env.customer("Late", Decimal::ZERO);
    let later = env.record(
        &customer,
        TransactionKind::Credit,
        dec!(100),
        start_instant() + Duration::days(3),
    );
    // Recorded after `later` but dated before it.
    let earlier = env.record(&customer, TransactionKind::Credit, dec!(10), start_instant());
    assert_eq!(earlier.balance_after, dec!(110));

    let audit = env.book.audit(USER, customer.id).expect("audit");
    assert!(!audit.has_drift());
    assert_eq!(audit.stale_snapshots, vec![earlier.id, later.id]);

    let ledger = env.book.ledger(USER, customer.id).expect("ledger");
    let balances: Vec<Decimal> = ledger.iter().map(|row| row.balance).collect();
    assert_eq!(balances, vec![dec!(10), dec!(110)]);
}

#[test]
fn reconcile_repairs_a_drifted_balance() {
    let env = setup_test_env();
    let customer = env.customer("Drift", dec!(20));
    env.record(&customer, TransactionKind::Credit, dec!(30), start_instant());
    env.store
        .update_customer_balance(USER, customer.id, dec!(999), start_instant())
        .expect("corrupt balance");

    let audit = env.book.reconcile(USER, customer.id).expect("reconcile");
    assert_eq!(audit.stored_balance, dec!(999));
    assert_eq!(audit.recomputed_balance, dec!(50));
    let stored = env.book.customer(USER, customer.id).expect("customer");
    assert_eq!(stored.current_balance, dec!(50));
    assert!(env.book.audit(USER, customer.id).expect("audit").is_clean());
}

#[test]
fn missing_records_fail_fast() {
    let env = setup_test_env();
    assert!(matches!(
        env.book.ledger(USER, Uuid::new_v4()),
        Err(LedgerError::CustomerNotFound(_))
    ));
    assert!(matches!(
        env.book.delete_transaction(USER, Uuid::new_v4()),
        Err(LedgerError::TransactionNotFound(_))
    ));
}

#[test]
fn receivable_rollup_and_reminders() {
    let env = setup_test_env();
    let owes_more = env.customer("A", dec!(900));
    let owes_less = env.customer("B", dec!(100));
    let advance = env.customer("C", dec!(-250));
    env.customer("D", Decimal::ZERO);
    env.record(&owes_less, TransactionKind::Credit, dec!(50), start_instant());

    let summary = env.book.receivables(USER).expect("rollup");
    assert_eq!(summary.total_receivable, dec!(1050));
    assert_eq!(summary.total_payable, dec!(250));
    assert_eq!(summary.net_outstanding, dec!(800));
    assert_eq!(summary.receivable_customers, 2);
    assert_eq!(summary.payable_customers, 1);
    assert_eq!(summary.settled_customers, 1);

    let reminders: Vec<Uuid> = env
        .book
        .reminders(USER)
        .expect("reminders")
        .into_iter()
        .map(|customer| customer.id)
        .collect();
    assert_eq!(reminders, vec![owes_more.id, owes_less.id]);
    assert!(!reminders.contains(&advance.id));
}

#[test]
fn concurrent_writers_keep_balance_consistent() {
    let env = setup_test_env();
    let customer = env.customer("Kiran", Decimal::ZERO);

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..200 {
                    env.book
                        .add_transaction(
                            USER,
                            NewTransaction::new(
                                customer.id,
                                TransactionKind::Credit,
                                dec!(1),
                                start_instant(),
                            ),
                        )
                        .expect("add transaction");
                }
            });
        }
    });

    let audit = env.book.audit(USER, customer.id).expect("audit");
    assert_eq!(audit.stored_balance, dec!(1600));
    assert_eq!(audit.recomputed_balance, dec!(1600));
    assert_eq!(
        env.book.customer(USER, customer.id).expect("customer").current_balance,
        dec!(1600)
    );
}
