pub mod customer_service;
pub mod income_service;
pub mod ledger_service;
pub mod report_service;

pub use customer_service::CustomerService;
pub use income_service::{IncomeService, IncomeWrite};
pub use ledger_service::LedgerService;
pub use report_service::ReportService;
