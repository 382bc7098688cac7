use anyhow::{Context, Result};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::{MonthlyBudget, YearMonth};

const HEADER: [&str; 2] = ["year_month", "amount"];

/// Reads and writes `year_month,amount` budget files.
pub(crate) struct BudgetCsv;

impl BudgetCsv {
    /// Load budgets from a CSV file. A leading header row is detected and
    /// skipped.
    pub(crate) fn read(path: &Path) -> Result<Vec<MonthlyBudget>> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result.context("Failed to read CSV record")?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        if rows.first().is_some_and(|row| looks_like_header(row)) {
            debug!("Skipping header row: {:?}", rows[0]);
            rows.remove(0);
        }

        Self::parse(&rows)
    }

    /// Parse already-split rows into budgets. Row numbers in errors are 1-based.
    pub(crate) fn parse(rows: &[Vec<String>]) -> Result<Vec<MonthlyBudget>> {
        let mut budgets = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.iter().all(|field| field.trim().is_empty()) {
                warn!("Skipping blank row {}", i + 1);
                continue;
            }

            let month_str = row.first().map(|s| s.trim()).unwrap_or_default();
            let year_month = YearMonth::from_str(month_str)
                .with_context(|| format!("Row {}: failed to parse month '{}'", i + 1, month_str))?;

            let amount_str = row.get(1).map(|s| s.trim()).unwrap_or_default();
            let amount = parse_amount(amount_str)
                .with_context(|| format!("Row {}: failed to parse amount", i + 1))?;

            budgets.push(MonthlyBudget::new(year_month, amount));
        }
        Ok(budgets)
    }

    /// Write budgets oldest month first. Returns the number of rows written.
    pub(crate) fn write(path: &Path, budgets: &[MonthlyBudget]) -> Result<usize> {
        let mut sorted: Vec<&MonthlyBudget> = budgets.iter().collect();
        sorted.sort_by_key(|b| b.year_month);

        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        wtr.write_record(HEADER)?;
        for budget in &sorted {
            wtr.write_record([budget.year_month.compact(), budget.amount.to_string()])?;
        }
        wtr.flush()?;
        Ok(sorted.len())
    }
}

fn looks_like_header(row: &[String]) -> bool {
    let first = row.first().map(|s| s.trim()).unwrap_or_default();
    YearMonth::from_str(first).is_err() && !first.is_empty()
}

/// Parse a budget amount, tolerating currency symbols and thousands separators.
/// Budgets are never negative.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned = s.replace(['$', ',', '"'], "").trim().to_string();
    if cleaned.is_empty() {
        anyhow::bail!("Amount is empty");
    }
    if cleaned.starts_with('(') || cleaned.starts_with('-') {
        anyhow::bail!("Budget amount cannot be negative: '{s}'");
    }
    Decimal::from_str(&cleaned).with_context(|| format!("Failed to parse '{s}' as decimal"))
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
