use rust_decimal::Decimal;

use crate::{
    domain::{
        customer::{BalanceDirection, Customer, CustomerPatch, NewCustomer},
        report::ReceivableSummary,
        transaction::{NewTransaction, Transaction},
    },
    errors::{LedgerError, Result},
};

pub struct CustomerService;

impl CustomerService {
    pub fn validate_new(customer: &NewCustomer) -> Result<()> {
        if customer.name.trim().is_empty() {
            return Err(LedgerError::InvalidInput("customer name is required".into()));
        }
        if customer.phone.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "customer phone is required".into(),
            ));
        }
        Ok(())
    }

    /// Same rules as [`CustomerService::validate_new`] for the fields a patch sets.
    pub fn validate_patch(patch: &CustomerPatch) -> Result<()> {
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(LedgerError::InvalidInput("customer name is required".into()));
        }
        if patch.phone.as_deref().is_some_and(|phone| phone.trim().is_empty()) {
            return Err(LedgerError::InvalidInput(
                "customer phone is required".into(),
            ));
        }
        Ok(())
    }

    pub fn validate_transaction(transaction: &NewTransaction) -> Result<()> {
        if transaction.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!(
                "transaction amount must be positive, got {}",
                transaction.amount
            )));
        }
        Ok(())
    }

    /// Balance after recording `transaction` on top of `current`.
    pub fn balance_after_adding(current: Decimal, transaction: &Transaction) -> Decimal {
        current + transaction.signed_amount()
    }

    /// Balance after removing `transaction`: the exact inverse of adding it.
    pub fn balance_after_removing(current: Decimal, transaction: &Transaction) -> Decimal {
        current - transaction.signed_amount()
    }

    /// Receivable and payable totals over the given customers.
    pub fn rollup(customers: &[Customer]) -> ReceivableSummary {
        let mut summary = ReceivableSummary {
            total_receivable: Decimal::ZERO,
            total_payable: Decimal::ZERO,
            net_outstanding: Decimal::ZERO,
            receivable_customers: 0,
            payable_customers: 0,
            settled_customers: 0,
        };
        for customer in customers {
            match customer.direction() {
                BalanceDirection::Receivable => {
                    summary.total_receivable += customer.receivable();
                    summary.receivable_customers += 1;
                }
                BalanceDirection::Payable => {
                    summary.total_payable += customer.payable();
                    summary.payable_customers += 1;
                }
                BalanceDirection::Settled => summary.settled_customers += 1,
            }
        }
        summary.net_outstanding = summary.total_receivable - summary.total_payable;
        summary
    }

    /// Active customers who owe money, largest balance first.
    pub fn reminders(customers: &[Customer]) -> Vec<Customer> {
        let mut owing: Vec<Customer> = customers
            .iter()
            .filter(|customer| {
                customer.is_active() && customer.direction() == BalanceDirection::Receivable
            })
            .cloned()
            .collect();
        owing.sort_by(|a, b| b.current_balance.cmp(&a.current_balance));
        owing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn with_balance(name: &str, balance: Decimal) -> Customer {
        let mut customer = Customer::new("u1", name, "555", Decimal::ZERO, Utc::now());
        customer.current_balance = balance;
        customer
    }

    #[test]
    fn rollup_splits_receivable_and_payable() {
        let customers = vec![
            with_balance("a", dec!(300)),
            with_balance("b", dec!(-120.50)),
            with_balance("c", dec!(0)),
            with_balance("d", dec!(45.25)),
        ];
        let summary = CustomerService::rollup(&customers);
        assert_eq!(summary.total_receivable, dec!(345.25));
        assert_eq!(summary.total_payable, dec!(120.50));
        assert_eq!(summary.net_outstanding, dec!(224.75));
        assert_eq!(summary.receivable_customers, 2);
        assert_eq!(summary.payable_customers, 1);
        assert_eq!(summary.settled_customers, 1);
    }

    #[test]
    fn reminders_list_active_debtors_largest_first() {
        let mut dormant = with_balance("dormant", dec!(900));
        dormant.status = CustomerStatus::Inactive;
        let customers = vec![
            with_balance("small", dec!(10)),
            with_balance("advance", dec!(-50)),
            dormant,
            with_balance("big", dec!(500)),
        ];
        let names: Vec<String> = CustomerService::reminders(&customers)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["big".to_string(), "small".to_string()]);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let txn = NewTransaction::new(
            uuid::Uuid::new_v4(),
            crate::domain::transaction::TransactionKind::Credit,
            dec!(0),
            Utc::now(),
        );
        assert!(CustomerService::validate_transaction(&txn).is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(CustomerService::validate_new(&NewCustomer::new("  ", "555")).is_err());
        assert!(CustomerService::validate_new(&NewCustomer::new("Asha", "555")).is_ok());
    }
}
