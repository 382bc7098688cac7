#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;
use std::io::Write;

fn make_csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn ym(s: &str) -> YearMonth {
    s.parse().unwrap()
}

// ── parse_amount ──────────────────────────────────────────────

#[test]
fn test_parse_amount_basic() {
    assert_eq!(parse_amount("100.50").unwrap(), dec!(100.50));
    assert_eq!(parse_amount("42").unwrap(), dec!(42));
}

#[test]
fn test_parse_amount_with_currency() {
    assert_eq!(parse_amount("$1,234.56").unwrap(), dec!(1234.56));
    assert_eq!(parse_amount("\"$1,234,567.89\"").unwrap(), dec!(1234567.89));
}

#[test]
fn test_parse_amount_rejects_negative() {
    assert!(parse_amount("-42.99").is_err());
    assert!(parse_amount("(500.00)").is_err());
    assert!(parse_amount("-$99.99").is_err());
}

#[test]
fn test_parse_amount_empty() {
    assert!(parse_amount("").is_err());
    assert!(parse_amount("  ").is_err());
}

#[test]
fn test_parse_amount_invalid() {
    assert!(parse_amount("not_a_number").is_err());
}

// ── BudgetCsv::read ───────────────────────────────────────────

#[test]
fn test_read_with_header() {
    let file = make_csv_file("year_month,amount\n202401,310\n202402,400\n");
    let budgets = BudgetCsv::read(file.path()).unwrap();
    assert_eq!(budgets.len(), 2);
    assert_eq!(budgets[0].year_month, ym("202401"));
    assert_eq!(budgets[1].amount, dec!(400));
}

#[test]
fn test_read_without_header() {
    let file = make_csv_file("202403,3100\n2024-01,310\n");
    let budgets = BudgetCsv::read(file.path()).unwrap();
    assert_eq!(budgets.len(), 2);
    // Source order is preserved
    assert_eq!(budgets[0].year_month, ym("202403"));
    assert_eq!(budgets[1].year_month, ym("202401"));
}

#[test]
fn test_read_trims_and_skips_blank_rows() {
    let file = make_csv_file("Month, Amount\n 202401 , $310.00 \n,\n202402,\"1,000\"\n");
    let budgets = BudgetCsv::read(file.path()).unwrap();
    assert_eq!(budgets.len(), 2);
    assert_eq!(budgets[0].amount, dec!(310.00));
    assert_eq!(budgets[1].amount, dec!(1000));
}

#[test]
fn test_read_empty_file() {
    let file = make_csv_file("");
    assert!(BudgetCsv::read(file.path()).unwrap().is_empty());
}

#[test]
fn test_read_bad_month_names_row() {
    let file = make_csv_file("year_month,amount\n202401,310\n202413,400\n");
    let err = BudgetCsv::read(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("Row 2"));
}

#[test]
fn test_read_missing_amount() {
    let file = make_csv_file("202401\n");
    let err = BudgetCsv::read(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse amount"));
}

#[test]
fn test_read_missing_file() {
    assert!(BudgetCsv::read(Path::new("/nonexistent/budgets.csv")).is_err());
}

// ── BudgetCsv::write ──────────────────────────────────────────

#[test]
fn test_write_sorted_with_header() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let budgets = vec![
        MonthlyBudget::new(ym("202402"), dec!(400)),
        MonthlyBudget::new(ym("202401"), dec!(310.50)),
    ];
    assert_eq!(BudgetCsv::write(file.path(), &budgets).unwrap(), 2);

    let written = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(written, "year_month,amount\n202401,310.50\n202402,400\n");
}

#[test]
fn test_written_file_reads_back() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let budgets = vec![
        MonthlyBudget::new(ym("202312"), dec!(12.34)),
        MonthlyBudget::new(ym("202401"), dec!(310)),
    ];
    BudgetCsv::write(file.path(), &budgets).unwrap();
    assert_eq!(BudgetCsv::read(file.path()).unwrap(), budgets);
}
