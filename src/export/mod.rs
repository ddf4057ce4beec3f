//! Tabular export of reports, ledgers and income stats.
//!
//! Builders flatten aggregator output into an [`ExportDocument`] of display
//! strings. Rendering is left to an [`Exporter`]; [`CsvExporter`] ships with
//! the crate and hosts can plug in other formats.

use std::{io::Write, path::Path};

use csv::WriterBuilder;
use tracing::info;

use crate::{
    currency::{MoneyFormat, NegativeStyle},
    domain::{
        common::Displayable,
        customer::Customer,
        ledger::LedgerEntry,
        report::{MonthlyStats, Report, YearlyStats},
    },
    errors::{LedgerError, Result},
    utils::persistence::write_file,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Title, label/value summary lines, then a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub title: String,
    pub summary_rows: Vec<(String, String)>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportDocument {
    pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            summary_rows: Vec::new(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.summary_rows.push((label.into(), value.into()));
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(LedgerError::Export(format!(
                "row has {} cells but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// One table row per day; payment and customer totals go in the summary.
    pub fn from_report(report: &Report, money: &MoneyFormat) -> Result<Self> {
        let mut doc = Self::new(
            format!("Transaction Report: {}", report.period.label()),
            &["Date", "Credits", "Debits", "Net"],
        );
        doc.push_summary("Total Credits", money.format(report.total_credits));
        doc.push_summary("Total Debits", money.format(report.total_debits));
        doc.push_summary("Net Amount", money.format(report.net_amount));
        doc.push_summary("Transactions", report.transaction_count.to_string());
        for method in &report.payment_breakdown {
            doc.push_summary(
                format!("Paid by {}", method.method),
                format!("{} ({})", money.format(method.amount), method.count),
            );
        }
        for day in &report.daily_breakdown {
            doc.push_row(vec![
                day.date.format(DATE_FORMAT).to_string(),
                money.format(day.credits),
                money.format(day.debits),
                money.format(day.net),
            ])?;
        }
        for customer in &report.customer_breakdown {
            doc.push_summary(
                format!("Customer {}", customer.customer_name),
                money.format(customer.balance),
            );
        }
        Ok(doc)
    }

    /// A customer statement. Balances render with Dr/Cr labels.
    pub fn from_ledger(
        customer: &Customer,
        entries: &[LedgerEntry],
        money: &MoneyFormat,
    ) -> Result<Self> {
        let ledger_money = money.clone().with_negative_style(NegativeStyle::DrCr);
        let mut doc = Self::new(
            format!("Ledger: {}", customer.display_label()),
            &["Date", "Description", "Credit", "Debit", "Balance"],
        );
        doc.push_summary("Opening Balance", ledger_money.format(customer.opening_balance));
        doc.push_summary("Current Balance", ledger_money.format(customer.current_balance));
        for entry in entries {
            doc.push_row(vec![
                entry.date.format(DATE_FORMAT).to_string(),
                entry.description.clone(),
                blank_if_zero(money, entry.credit),
                blank_if_zero(money, entry.debit),
                ledger_money.format(entry.balance),
            ])?;
        }
        Ok(doc)
    }

    pub fn from_monthly_stats(
        year: i32,
        monthly: &[MonthlyStats],
        yearly: &YearlyStats,
        money: &MoneyFormat,
    ) -> Result<Self> {
        let mut doc = Self::new(
            format!("Income Summary {}", year),
            &["Month", "Primary", "Secondary", "Total", "Net", "Pending", "Received"],
        );
        doc.push_summary("Total Income", money.format(yearly.total_income));
        doc.push_summary("Primary Income", money.format(yearly.total_primary));
        doc.push_summary("Secondary Income", money.format(yearly.total_secondary));
        doc.push_summary("Monthly Average", money.format(yearly.monthly_average));
        doc.push_summary(
            "Highest Month",
            format!(
                "{} ({})",
                yearly.highest_month,
                money.format(yearly.highest_month_total)
            ),
        );
        for month in monthly {
            doc.push_row(vec![
                month.month.name().to_string(),
                money.format(month.primary),
                money.format(month.secondary),
                money.format(month.total),
                money.format(month.net),
                money.format(month.pending),
                money.format(month.received),
            ])?;
        }
        Ok(doc)
    }
}

fn blank_if_zero(money: &MoneyFormat, amount: rust_decimal::Decimal) -> String {
    if amount.is_zero() {
        String::new()
    } else {
        money.format(amount)
    }
}

/// Renders an [`ExportDocument`] into some byte format.
pub trait Exporter {
    fn extension(&self) -> &'static str;
    fn write(&self, doc: &ExportDocument, out: &mut dyn Write) -> Result<()>;

    fn render(&self, doc: &ExportDocument) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(doc, &mut buffer)?;
        Ok(buffer)
    }
}

/// Title line, summary pairs, a blank line, then the header and table rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Renders `doc` and writes it to `path`, creating parent directories.
    pub fn export_to_path(&self, doc: &ExportDocument, path: &Path) -> Result<()> {
        let bytes = self.render(doc)?;
        let text = String::from_utf8(bytes)
            .map_err(|err| LedgerError::Export(format!("csv output is not utf-8: {}", err)))?;
        write_file(path, &text)?;
        info!(path = %path.display(), rows = doc.rows.len(), "csv export written");
        Ok(())
    }
}

impl Exporter for CsvExporter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write(&self, doc: &ExportDocument, out: &mut dyn Write) -> Result<()> {
        let mut wrt = WriterBuilder::new().flexible(true).from_writer(out);
        wrt.write_record([doc.title.as_str()])?;
        for (label, value) in &doc.summary_rows {
            wrt.write_record([label.as_str(), value.as_str()])?;
        }
        wrt.write_record([""])?;
        wrt.write_record(&doc.columns)?;
        for row in &doc.rows {
            wrt.write_record(row)?;
        }
        wrt.flush()?;
        Ok(())
    }
}
