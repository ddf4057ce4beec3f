//! Aggregated views produced by the report and income aggregators.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{income::Month, transaction::PaymentMethod},
    errors::{LedgerError, Result},
};

/// Inclusive span of business days a report covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportPeriod {
    pub kind: PeriodKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Daily,
    Monthly,
    Range,
}

impl ReportPeriod {
    pub fn day(date: NaiveDate) -> Self {
        Self {
            kind: PeriodKind::Daily,
            start: date,
            end: date,
        }
    }

    pub fn month(year: i32, month: Month) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month.number(), 1).ok_or_else(|| {
            LedgerError::InvalidInput(format!("{} {} is not a valid month", month, year))
        })?;
        let next = match month {
            Month::December => NaiveDate::from_ymd_opt(year + 1, 1, 1),
            _ => NaiveDate::from_ymd_opt(year, month.number() + 1, 1),
        }
        .ok_or_else(|| LedgerError::InvalidInput(format!("year {} is out of range", year)))?;
        let end = next
            .pred_opt()
            .ok_or_else(|| LedgerError::InvalidInput(format!("year {} is out of range", year)))?;
        Ok(Self {
            kind: PeriodKind::Monthly,
            start,
            end,
        })
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Result<Self> {
        let month = Month::from_number(date.month())
            .ok_or_else(|| LedgerError::InvalidInput(format!("bad month in {}", date)))?;
        Self::month(date.year(), month)
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(LedgerError::InvalidInput(
                "report end must not be before start".into(),
            ));
        }
        Ok(Self {
            kind: PeriodKind::Range,
            start,
            end,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn label(&self) -> String {
        match self.kind {
            PeriodKind::Daily => self.start.format("%Y-%m-%d").to_string(),
            PeriodKind::Monthly => self.start.format("%B %Y").to_string(),
            PeriodKind::Range => format!(
                "{} to {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub period: ReportPeriod,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub net_amount: Decimal,
    pub transaction_count: usize,
    /// Days with at least one transaction, ascending.
    pub daily_breakdown: Vec<DailyTotals>,
    /// Customers with at least one transaction, in first-seen order.
    pub customer_breakdown: Vec<CustomerTotals>,
    /// Payment methods in first-seen order.
    pub payment_breakdown: Vec<PaymentMethodTotals>,
    #[serde(default)]
    pub warnings: Vec<DataIntegrityWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub credits: Decimal,
    pub debits: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerTotals {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub credits: Decimal,
    pub debits: Decimal,
    /// `credits - debits` over the period.
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentMethodTotals {
    pub method: PaymentMethod,
    pub amount: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyStats {
    pub month: Month,
    pub primary: Decimal,
    pub secondary: Decimal,
    /// `primary + secondary`.
    pub total: Decimal,
    /// `credits - debits`.
    pub net: Decimal,
    pub pending: Decimal,
    pub received: Decimal,
}

impl MonthlyStats {
    pub fn empty(month: Month) -> Self {
        Self {
            month,
            primary: Decimal::ZERO,
            secondary: Decimal::ZERO,
            total: Decimal::ZERO,
            net: Decimal::ZERO,
            pending: Decimal::ZERO,
            received: Decimal::ZERO,
        }
    }
}

/// One row per calendar month, January first.
pub type MonthlyBreakdown = [MonthlyStats; 12];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearlyStats {
    pub total_primary: Decimal,
    pub total_secondary: Decimal,
    pub total_income: Decimal,
    /// `total_income / 12`, whatever the number of months with data.
    pub monthly_average: Decimal,
    pub highest_month: Month,
    pub highest_month_total: Decimal,
}

/// Receivable and payable totals across a set of customers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceivableSummary {
    pub total_receivable: Decimal,
    pub total_payable: Decimal,
    /// `total_receivable - total_payable`.
    pub net_outstanding: Decimal,
    pub receivable_customers: usize,
    pub payable_customers: usize,
    pub settled_customers: usize,
}

/// Per-record anomaly that was tolerated instead of failing the aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIntegrityWarning {
    /// Kept in totals, left out of the customer breakdown.
    OrphanTransaction {
        transaction_id: Uuid,
        customer_id: Uuid,
    },
    /// Counted as received.
    MissingIncomeStatus { entry_id: Uuid },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_period_spans_whole_month() {
        let feb = ReportPeriod::month(2024, Month::February).unwrap();
        assert_eq!(feb.start, date(2024, 2, 1));
        assert_eq!(feb.end, date(2024, 2, 29));
        let dec = ReportPeriod::month(2024, Month::December).unwrap();
        assert_eq!(dec.end, date(2024, 12, 31));
        assert_eq!(dec.day_count(), 31);
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(ReportPeriod::range(date(2024, 3, 2), date(2024, 3, 1)).is_err());
        let single = ReportPeriod::range(date(2024, 3, 1), date(2024, 3, 1)).unwrap();
        assert_eq!(single.day_count(), 1);
        assert!(single.contains(date(2024, 3, 1)));
    }

    #[test]
    fn labels_read_naturally() {
        assert_eq!(ReportPeriod::day(date(2025, 6, 9)).label(), "2025-06-09");
        assert_eq!(
            ReportPeriod::month_of(date(2025, 6, 9)).unwrap().label(),
            "June 2025"
        );
    }
}
