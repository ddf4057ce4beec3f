//! Income stats aggregator and merge-on-write rules for the income tracker.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::{
    domain::{
        income::{IncomeCategory, IncomeEntry, IncomeStatus, Month, NewIncomeEntry},
        report::{DataIntegrityWarning, MonthlyBreakdown, MonthlyStats, YearlyStats},
        transaction::TransactionKind,
    },
    errors::{LedgerError, Result},
};

const MONTHS_PER_YEAR: u32 = 12;

/// What a write of a new income record should do to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum IncomeWrite {
    Insert(IncomeEntry),
    /// Replace the stored record with this merged version.
    Merge(IncomeEntry),
}

impl IncomeWrite {
    pub fn entry(&self) -> &IncomeEntry {
        match self {
            IncomeWrite::Insert(entry) | IncomeWrite::Merge(entry) => entry,
        }
    }
}

pub struct IncomeService;

impl IncomeService {
    /// Twelve month buckets in calendar order, January first.
    pub fn monthly_stats(entries: &[IncomeEntry]) -> MonthlyBreakdown {
        Self::monthly_stats_checked(entries).0
    }

    /// Same as [`IncomeService::monthly_stats`], also reporting records that
    /// had no status and were counted as received.
    pub fn monthly_stats_checked(
        entries: &[IncomeEntry],
    ) -> (MonthlyBreakdown, Vec<DataIntegrityWarning>) {
        let mut months = Month::ALL.map(MonthlyStats::empty);
        let mut credits = [Decimal::ZERO; 12];
        let mut debits = [Decimal::ZERO; 12];
        let mut warnings = Vec::new();

        for entry in entries {
            let idx = entry.month.index();
            match entry.kind {
                TransactionKind::Credit => {
                    credits[idx] += entry.amount;
                    let bucket = &mut months[idx];
                    match entry.category {
                        IncomeCategory::Primary => bucket.primary += entry.amount,
                        IncomeCategory::Secondary => bucket.secondary += entry.amount,
                    }
                    if entry.status.is_none() {
                        warnings.push(DataIntegrityWarning::MissingIncomeStatus {
                            entry_id: entry.id,
                        });
                    }
                    match entry.effective_status() {
                        IncomeStatus::Pending => bucket.pending += entry.amount,
                        IncomeStatus::Received => bucket.received += entry.amount,
                    }
                }
                TransactionKind::Debit => debits[idx] += entry.amount,
            }
        }

        for (idx, bucket) in months.iter_mut().enumerate() {
            bucket.total = bucket.primary + bucket.secondary;
            bucket.net = credits[idx] - debits[idx];
        }
        if !warnings.is_empty() {
            warn!(
                count = warnings.len(),
                "income entries without a status were counted as received"
            );
        }
        (months, warnings)
    }

    pub fn yearly_stats(entries: &[IncomeEntry]) -> YearlyStats {
        Self::yearly_from_monthly(&Self::monthly_stats(entries))
    }

    /// Rolls twelve month buckets into year totals.
    ///
    /// The average always divides by twelve, giving a full-year run rate. The
    /// highest month is the first one in calendar order holding the top total.
    pub fn yearly_from_monthly(monthly: &[MonthlyStats]) -> YearlyStats {
        let total_primary: Decimal = monthly.iter().map(|m| m.primary).sum();
        let total_secondary: Decimal = monthly.iter().map(|m| m.secondary).sum();
        let total_income = total_primary + total_secondary;

        let mut highest: Option<&MonthlyStats> = None;
        for month in monthly {
            if highest.map_or(true, |best| month.total > best.total) {
                highest = Some(month);
            }
        }

        YearlyStats {
            total_primary,
            total_secondary,
            total_income,
            monthly_average: total_income / Decimal::from(MONTHS_PER_YEAR),
            highest_month: highest.map_or(Month::January, |m| m.month),
            highest_month_total: highest.map_or(Decimal::ZERO, |m| m.total),
        }
    }

    pub fn validate(new_entry: &NewIncomeEntry) -> Result<()> {
        if new_entry.amount.is_sign_negative() && !new_entry.amount.is_zero() {
            return Err(LedgerError::InvalidInput(
                "income amount must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Decides whether a new record is inserted or folded into `existing`,
    /// the stored record sharing its six-field key.
    pub fn plan_write(
        user_id: &str,
        existing: Option<IncomeEntry>,
        new_entry: NewIncomeEntry,
        now: DateTime<Utc>,
    ) -> Result<IncomeWrite> {
        Self::validate(&new_entry)?;
        match existing {
            Some(mut stored) => {
                if stored.key() != new_entry.key(user_id) {
                    return Err(LedgerError::InvalidInput(
                        "cannot merge income records with different keys".into(),
                    ));
                }
                stored.absorb(new_entry.amount, new_entry.description.as_deref(), now);
                Ok(IncomeWrite::Merge(stored))
            }
            None => Ok(IncomeWrite::Insert(new_entry.into_entry(user_id, now))),
        }
    }
}
