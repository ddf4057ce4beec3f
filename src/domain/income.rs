//! Income tracker records, bucketed by calendar month rather than by customer.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{common::*, transaction::TransactionKind},
    errors::LedgerError,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeEntry {
    pub id: Uuid,
    pub user_id: String,
    /// Never negative; direction lives in `kind`.
    pub amount: Decimal,
    pub category: IncomeCategory,
    pub month: Month,
    pub year: i32,
    pub kind: TransactionKind,
    /// Absent on records written before statuses existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IncomeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IncomeEntry {
    pub fn effective_status(&self) -> IncomeStatus {
        self.status.unwrap_or_default()
    }

    pub fn key(&self) -> IncomeKey {
        IncomeKey {
            user_id: self.user_id.clone(),
            year: self.year,
            month: self.month,
            kind: self.kind,
            category: self.category,
            status: self.effective_status(),
        }
    }

    /// Folds another record with the same key into this one.
    pub fn absorb(&mut self, amount: Decimal, description: Option<&str>, now: DateTime<Utc>) {
        self.amount += amount;
        self.description = join_descriptions(self.description.as_deref(), description);
        if self.status.is_none() {
            self.status = Some(IncomeStatus::default());
        }
        self.updated_at = now;
    }
}

impl Identifiable for IncomeEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl UserScoped for IncomeEntry {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Joins two optional descriptions with `", "`, skipping blanks.
pub fn join_descriptions(existing: Option<&str>, incoming: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [existing, incoming]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// The six fields that identify a single stored income record per user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncomeKey {
    pub user_id: String,
    pub year: i32,
    pub month: Month,
    pub kind: TransactionKind,
    pub category: IncomeCategory,
    pub status: IncomeStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IncomeCategory {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum IncomeStatus {
    Pending,
    #[default]
    Received,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// Canonical calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self.index() as u32 + 1
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_number(number: u32) -> Option<Self> {
        Self::ALL.get((number as usize).checked_sub(1)?).copied()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = LedgerError;

    /// Accepts full English names and three-letter abbreviations, any case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        Month::ALL
            .into_iter()
            .find(|month| {
                let name = month.name().to_ascii_lowercase();
                name == needle || (needle.len() == 3 && name.starts_with(&needle))
            })
            .ok_or_else(|| LedgerError::InvalidInput(format!("unknown month `{}`", value)))
    }
}

/// Caller-supplied fields for an income record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIncomeEntry {
    pub amount: Decimal,
    pub category: IncomeCategory,
    pub month: Month,
    pub year: i32,
    pub kind: TransactionKind,
    #[serde(default)]
    pub status: IncomeStatus,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewIncomeEntry {
    pub fn credit(amount: Decimal, category: IncomeCategory, month: Month, year: i32) -> Self {
        Self {
            amount,
            category,
            month,
            year,
            kind: TransactionKind::Credit,
            status: IncomeStatus::Received,
            description: None,
        }
    }

    pub fn debit(amount: Decimal, category: IncomeCategory, month: Month, year: i32) -> Self {
        Self {
            kind: TransactionKind::Debit,
            ..Self::credit(amount, category, month, year)
        }
    }

    pub fn with_status(mut self, status: IncomeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn key(&self, user_id: &str) -> IncomeKey {
        IncomeKey {
            user_id: user_id.to_string(),
            year: self.year,
            month: self.month,
            kind: self.kind,
            category: self.category,
            status: self.status,
        }
    }

    pub fn into_entry(self, user_id: &str, now: DateTime<Utc>) -> IncomeEntry {
        IncomeEntry {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            amount: self.amount,
            category: self.category,
            month: self.month,
            year: self.year,
            kind: self.kind,
            status: Some(self.status),
            description: join_descriptions(None, self.description.as_deref()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field patch for an existing income record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<IncomeCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<Month>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IncomeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl IncomePatch {
    pub fn apply_to(self, entry: &mut IncomeEntry, now: DateTime<Utc>) {
        if let Some(amount) = self.amount {
            entry.amount = amount;
        }
        if let Some(category) = self.category {
            entry.category = category;
        }
        if let Some(month) = self.month {
            entry.month = month;
        }
        if let Some(year) = self.year {
            entry.year = year;
        }
        if let Some(kind) = self.kind {
            entry.kind = kind;
        }
        if let Some(status) = self.status {
            entry.status = Some(status);
        }
        if let Some(description) = self.description {
            entry.description = description;
        }
        entry.updated_at = now;
    }
}
