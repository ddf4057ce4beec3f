//! Report aggregator: totals plus day, customer, and payment-method breakdowns.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    core::time::BusinessCalendar,
    domain::{
        customer::Customer,
        income::Month,
        report::{
            CustomerTotals, DailyTotals, DataIntegrityWarning, PaymentMethodTotals, Report,
            ReportPeriod,
        },
        transaction::{PaymentMethod, Transaction},
    },
    errors::Result,
};

pub struct ReportService;

impl ReportService {
    /// Aggregates transactions that the store already filtered to `period`.
    ///
    /// No date filtering happens here. Day buckets use `calendar`, which must be
    /// the calendar that produced the store's query bounds. When `customers` is
    /// given, a transaction whose customer is missing from it stays in the
    /// totals and day buckets but is left out of the customer breakdown.
    pub fn aggregate(
        transactions: &[Transaction],
        period: ReportPeriod,
        calendar: &BusinessCalendar,
        customers: Option<&[Customer]>,
    ) -> Report {
        let known: Option<HashSet<Uuid>> =
            customers.map(|list| list.iter().map(|customer| customer.id).collect());

        let mut total_credits = Decimal::ZERO;
        let mut total_debits = Decimal::ZERO;
        let mut days: BTreeMap<NaiveDate, DailyTotals> = BTreeMap::new();
        let mut customer_slots: HashMap<Uuid, usize> = HashMap::new();
        let mut customer_breakdown: Vec<CustomerTotals> = Vec::new();
        let mut method_slots: HashMap<PaymentMethod, usize> = HashMap::new();
        let mut payment_breakdown: Vec<PaymentMethodTotals> = Vec::new();
        let mut warnings = Vec::new();

        for txn in transactions {
            let credit = txn.credit_amount();
            let debit = txn.debit_amount();
            total_credits += credit;
            total_debits += debit;

            let date = calendar.local_date(txn.date);
            let day = days.entry(date).or_insert_with(|| DailyTotals {
                date,
                credits: Decimal::ZERO,
                debits: Decimal::ZERO,
                net: Decimal::ZERO,
            });
            day.credits += credit;
            day.debits += debit;
            day.net = day.credits - day.debits;

            let method_idx = *method_slots.entry(txn.payment_method).or_insert_with(|| {
                payment_breakdown.push(PaymentMethodTotals {
                    method: txn.payment_method,
                    amount: Decimal::ZERO,
                    count: 0,
                });
                payment_breakdown.len() - 1
            });
            payment_breakdown[method_idx].amount += txn.amount;
            payment_breakdown[method_idx].count += 1;

            if let Some(known) = known.as_ref() {
                if !known.contains(&txn.customer_id) {
                    warn!(
                        transaction_id = %txn.id,
                        customer_id = %txn.customer_id,
                        "transaction references an unknown customer; omitted from customer breakdown"
                    );
                    warnings.push(DataIntegrityWarning::OrphanTransaction {
                        transaction_id: txn.id,
                        customer_id: txn.customer_id,
                    });
                    continue;
                }
            }

            let customer_idx = *customer_slots.entry(txn.customer_id).or_insert_with(|| {
                customer_breakdown.push(CustomerTotals {
                    customer_id: txn.customer_id,
                    customer_name: txn.customer_name.clone(),
                    credits: Decimal::ZERO,
                    debits: Decimal::ZERO,
                    balance: Decimal::ZERO,
                });
                customer_breakdown.len() - 1
            });
            let totals = &mut customer_breakdown[customer_idx];
            totals.credits += credit;
            totals.debits += debit;
            totals.balance = totals.credits - totals.debits;
        }

        debug!(
            period = %period.label(),
            transactions = transactions.len(),
            days = days.len(),
            customers = customer_breakdown.len(),
            "report aggregated"
        );

        Report {
            period,
            total_credits,
            total_debits,
            net_amount: total_credits - total_debits,
            transaction_count: transactions.len(),
            daily_breakdown: days.into_values().collect(),
            customer_breakdown,
            payment_breakdown,
            warnings,
        }
    }

    pub fn daily(
        transactions: &[Transaction],
        date: NaiveDate,
        calendar: &BusinessCalendar,
        customers: Option<&[Customer]>,
    ) -> Report {
        Self::aggregate(transactions, ReportPeriod::day(date), calendar, customers)
    }

    pub fn monthly(
        transactions: &[Transaction],
        year: i32,
        month: Month,
        calendar: &BusinessCalendar,
        customers: Option<&[Customer]>,
    ) -> Result<Report> {
        let period = ReportPeriod::month(year, month)?;
        Ok(Self::aggregate(transactions, period, calendar, customers))
    }

    pub fn range(
        transactions: &[Transaction],
        start: NaiveDate,
        end: NaiveDate,
        calendar: &BusinessCalendar,
        customers: Option<&[Customer]>,
    ) -> Result<Report> {
        let period = ReportPeriod::range(start, end)?;
        Ok(Self::aggregate(transactions, period, calendar, customers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::TransactionKind;
    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, hour, 0, 0).unwrap()
    }

    fn txn(
        customer: &Customer,
        kind: TransactionKind,
        amount: Decimal,
        date: DateTime<Utc>,
        method: PaymentMethod,
    ) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            amount,
            kind,
            date,
            description: None,
            payment_method: method,
            balance_after: Decimal::ZERO,
            created_at: date,
        }
    }

    fn customers() -> (Customer, Customer) {
        let created = at(1, 0) - Duration::days(30);
        (
            Customer::new("u1", "Asha", "1", Decimal::ZERO, created),
            Customer::new("u1", "Bilal", "2", Decimal::ZERO, created),
        )
    }

    fn sample() -> (Vec<Transaction>, Customer, Customer) {
        let (asha, bilal) = customers();
        let txns = vec![
            txn(&bilal, TransactionKind::Credit, dec!(120.25), at(3, 10), PaymentMethod::Upi),
            txn(&asha, TransactionKind::Debit, dec!(40.10), at(1, 9), PaymentMethod::Cash),
            txn(&asha, TransactionKind::Credit, dec!(99.99), at(3, 15), PaymentMethod::Cash),
            txn(&bilal, TransactionKind::Debit, dec!(0.01), at(2, 23), PaymentMethod::Card),
        ];
        (txns, asha, bilal)
    }

    #[test]
    fn totals_and_breakdowns() {
        let (txns, asha, bilal) = sample();
        let period = ReportPeriod::month(2025, Month::May).unwrap();
        let report = ReportService::aggregate(&txns, period, &BusinessCalendar::utc(), None);

        assert_eq!(report.total_credits, dec!(220.24));
        assert_eq!(report.total_debits, dec!(40.11));
        assert_eq!(report.net_amount, dec!(180.13));
        assert_eq!(report.transaction_count, 4);

        let dates: Vec<u32> = report
            .daily_breakdown
            .iter()
            .map(|day| chrono::Datelike::day(&day.date))
            .collect();
        assert_eq!(dates, vec![1, 2, 3]);
        assert_eq!(report.daily_breakdown[2].credits, dec!(220.24));
        assert_eq!(report.daily_breakdown[0].net, dec!(-40.10));

        let ids: Vec<Uuid> = report
            .customer_breakdown
            .iter()
            .map(|row| row.customer_id)
            .collect();
        assert_eq!(ids, vec![bilal.id, asha.id], "first-seen order");
        assert_eq!(report.customer_breakdown[0].balance, dec!(120.24));
        assert_eq!(report.customer_breakdown[1].balance, dec!(59.89));

        let methods: Vec<PaymentMethod> = report
            .payment_breakdown
            .iter()
            .map(|row| row.method)
            .collect();
        assert_eq!(
            methods,
            vec![PaymentMethod::Upi, PaymentMethod::Cash, PaymentMethod::Card]
        );
        assert_eq!(report.payment_breakdown[1].count, 2);
        assert_eq!(report.payment_breakdown[1].amount, dec!(140.09));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn daily_sums_equal_totals() {
        let (txns, _, _) = sample();
        let period = ReportPeriod::month(2025, Month::May).unwrap();
        let report = ReportService::aggregate(&txns, period, &BusinessCalendar::utc(), None);
        let credits: Decimal = report.daily_breakdown.iter().map(|d| d.credits).sum();
        let debits: Decimal = report.daily_breakdown.iter().map(|d| d.debits).sum();
        assert_eq!(credits, report.total_credits);
        assert_eq!(debits, report.total_debits);
    }

    #[test]
    fn business_offset_moves_late_transactions_to_next_day() {
        let (txns, _, _) = sample();
        let ist = BusinessCalendar::new(FixedOffset::east_opt(19800).unwrap());
        let period = ReportPeriod::month(2025, Month::May).unwrap();
        let report = ReportService::aggregate(&txns, period, &ist, None);
        // 23:00 UTC on the 2nd is the morning of the 3rd in IST.
        assert_eq!(report.daily_breakdown.len(), 2);
        assert_eq!(report.daily_breakdown[1].debits, dec!(0.01));
    }

    #[test]
    fn orphans_stay_in_totals_only() {
        let (txns, asha, _bilal) = sample();
        let directory = vec![asha.clone()];
        let report = ReportService::aggregate(
            &txns,
            ReportPeriod::month(2025, Month::May).unwrap(),
            &BusinessCalendar::utc(),
            Some(&directory),
        );
        assert_eq!(report.total_credits, dec!(220.24));
        assert_eq!(report.customer_breakdown.len(), 1);
        assert_eq!(report.customer_breakdown[0].customer_id, asha.id);
        assert_eq!(report.warnings.len(), 2);
        assert!(matches!(
            report.warnings[0],
            DataIntegrityWarning::OrphanTransaction { .. }
        ));
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = ReportService::daily(
            &[],
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            &BusinessCalendar::utc(),
            None,
        );
        assert_eq!(report.transaction_count, 0);
        assert_eq!(report.net_amount, Decimal::ZERO);
        assert!(report.daily_breakdown.is_empty());
        assert!(report.customer_breakdown.is_empty());
    }

    #[test]
    fn aggregation_is_repeatable() {
        let (txns, _, _) = sample();
        let period = ReportPeriod::range(
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 3).unwrap(),
        )
        .unwrap();
        let first = ReportService::aggregate(&txns, period, &BusinessCalendar::utc(), None);
        let second = ReportService::aggregate(&txns, period, &BusinessCalendar::utc(), None);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
