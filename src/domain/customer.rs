//! Customers of the business and the sign convention of their balances.
//!
//! `current_balance` is positive when the customer owes the business
//! (a receivable, rendered "Dr") and negative when the business owes the
//! customer (a payable or advance, rendered "Cr"). A credit transaction raises
//! the balance and a debit lowers it; the ledger engine, the report aggregator
//! and the rollups all read balances this way.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Fixed at creation.
    pub opening_balance: Decimal,
    /// Denormalized running total, kept in step by every transaction write.
    pub current_balance: Decimal,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        opening_balance: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            phone: phone.into(),
            email: None,
            address: None,
            opening_balance,
            current_balance: opening_balance,
            status: CustomerStatus::Active,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn direction(&self) -> BalanceDirection {
        BalanceDirection::of(self.current_balance)
    }

    /// Amount the customer owes, zero when settled or in advance.
    pub fn receivable(&self) -> Decimal {
        self.current_balance.max(Decimal::ZERO)
    }

    /// Amount owed back to the customer, zero unless the balance is negative.
    pub fn payable(&self) -> Decimal {
        (-self.current_balance).max(Decimal::ZERO)
    }

    pub fn is_active(&self) -> bool {
        self.status == CustomerStatus::Active
    }

    pub fn apply_patch(&mut self, patch: CustomerPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}

impl Identifiable for Customer {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl UserScoped for Customer {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl Displayable for Customer {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.phone)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
}

/// Which side of the books a balance sits on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BalanceDirection {
    Receivable,
    Payable,
    Settled,
}

impl BalanceDirection {
    pub fn of(balance: Decimal) -> Self {
        if balance > Decimal::ZERO {
            BalanceDirection::Receivable
        } else if balance < Decimal::ZERO {
            BalanceDirection::Payable
        } else {
            BalanceDirection::Settled
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BalanceDirection::Receivable => "Dr",
            BalanceDirection::Payable => "Cr",
            BalanceDirection::Settled => "",
        }
    }
}

/// Input for creating a customer; the opening balance is set once here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub opening_balance: Decimal,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: None,
            address: None,
            opening_balance: Decimal::ZERO,
        }
    }

    pub fn with_opening_balance(mut self, opening_balance: Decimal) -> Self {
        self.opening_balance = opening_balance;
        self
    }
}

/// Editable customer fields. Balances are deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
}
