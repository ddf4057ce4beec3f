pub mod common;
pub mod customer;
pub mod income;
pub mod ledger;
pub mod report;
pub mod transaction;

pub use common::{Displayable, Identifiable, UserScoped};
pub use customer::{BalanceDirection, Customer, CustomerPatch, CustomerStatus, NewCustomer};
pub use income::{
    IncomeCategory, IncomeEntry, IncomeKey, IncomePatch, IncomeStatus, Month, NewIncomeEntry,
};
pub use ledger::{BalanceAudit, LedgerEntry, LedgerRef, OPENING_BALANCE_LABEL};
pub use report::{
    CustomerTotals, DailyTotals, DataIntegrityWarning, MonthlyBreakdown, MonthlyStats, PaymentMethodTotals,
    PeriodKind, ReceivableSummary, Report, ReportPeriod, YearlyStats,
};
pub use transaction::{NewTransaction, PaymentMethod, Transaction, TransactionKind};
