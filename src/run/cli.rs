use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::warn;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::db::Database;
use crate::format::format_amount;
use crate::import::{parse_amount, BudgetCsv};
use crate::models::{MonthlyBudget, YearMonth};
use crate::query::{total, BudgetQuery, BudgetSource};

pub(crate) fn as_cli(args: &[String], db_path: &Path) -> Result<()> {
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };
    let rest = &args[2..];
    match command.as_str() {
        "query" | "q" => cli_query(rest, db_path),
        "set" => cli_set(rest, db_path),
        "remove" | "rm" => cli_remove(rest, db_path),
        "list" | "ls" => cli_list(db_path),
        "import" => cli_import(rest, db_path),
        "export" => cli_export(rest, db_path),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("budgetquery {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("budgetquery — prorate monthly budgets over a date range");
    println!();
    println!("Usage: budgetquery <command>");
    println!();
    println!("Commands:");
    println!("  query <start> <end>           Budget attributable to the date range (inclusive)");
    println!("    --file <budgets.csv>        Read budgets from a CSV instead of the database");
    println!("    --breakdown                 Show each month's share");
    println!("  set <YYYYMM> <amount>         Set the budget for a month");
    println!("  remove <YYYYMM>               Delete the budget for a month");
    println!("  list                          List all budgets");
    println!("  import <file.csv>             Import year_month,amount rows");
    println!("  export [path]                 Export budgets to CSV");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Dates: YYYY-MM-DD, YYYYMMDD or MM/DD/YYYY; a YYYYMM or YYYY-MM");
    println!("month covers the whole month");
    println!("Database: $BUDGETQUERY_DB, or the platform data directory");
}

fn cli_query(args: &[String], db_path: &Path) -> Result<()> {
    let positional: Vec<&String> = positional_args(args, &["--file"]);
    let [start, end] = positional.as_slice() else {
        anyhow::bail!("Usage: budgetquery query <start> <end> [--file <budgets.csv>] [--breakdown]");
    };
    let start = parse_bound(start, YearMonth::first_day)?;
    let end = parse_bound(end, YearMonth::last_day)?;
    let show_breakdown = args.iter().any(|a| a == "--breakdown");

    if start > end {
        warn!("Start date {start} is after end date {end}");
    }

    if let Some(file) = flag_value(args, "--file") {
        let budgets = BudgetCsv::read(&PathBuf::from(shellexpand(file)))?;
        print_query(&BudgetQuery::new(budgets), start, end, show_breakdown)
    } else {
        let db = Database::open(db_path)?;
        print_query(&BudgetQuery::new(&db), start, end, show_breakdown)
    }
}

fn print_query<S: BudgetSource>(
    query: &BudgetQuery<S>,
    start: NaiveDate,
    end: NaiveDate,
    show_breakdown: bool,
) -> Result<()> {
    if show_breakdown {
        let shares = query.breakdown(start, end)?;
        for share in &shares {
            let coverage = format!("{}/{} days", share.days_covered, share.days_in_month);
            let marker = if share.is_partial() { "*" } else { " " };
            println!(
                "  {}{marker} {coverage:<12} {:>16}",
                share.year_month,
                format_amount(share.amount)
            );
        }
        if !shares.is_empty() {
            println!("{}", "─".repeat(40));
        }
        println!("{start} → {end}: {}", format_amount(total(&shares)));
    } else {
        let amount = query.query(start, end)?;
        println!("{start} → {end}: {}", format_amount(amount));
    }
    Ok(())
}

fn cli_set(args: &[String], db_path: &Path) -> Result<()> {
    let [month, amount] = args else {
        anyhow::bail!("Usage: budgetquery set <YYYYMM> <amount>");
    };
    let year_month = YearMonth::from_str(month)?;
    let amount = parse_amount(amount)?;

    let db = Database::open(db_path)?;
    let previous = db.get_budget(year_month)?;
    db.upsert_budget(&MonthlyBudget::new(year_month, amount))?;
    match previous {
        Some(old) => println!(
            "Budget for {year_month} set to {} (was {})",
            format_amount(amount),
            format_amount(old.amount)
        ),
        None => println!("Budget for {year_month} set to {}", format_amount(amount)),
    }
    Ok(())
}

fn cli_remove(args: &[String], db_path: &Path) -> Result<()> {
    let [month] = args else {
        anyhow::bail!("Usage: budgetquery remove <YYYYMM>");
    };
    let year_month = YearMonth::from_str(month)?;

    let db = Database::open(db_path)?;
    if db.delete_budget(year_month)? {
        println!("Removed budget for {year_month}");
    } else {
        println!("No budget for {year_month}");
    }
    Ok(())
}

fn cli_list(db_path: &Path) -> Result<()> {
    let db = Database::open(db_path)?;
    let budgets = db.get_all_budgets()?;
    if budgets.is_empty() {
        println!("No budgets");
        return Ok(());
    }

    println!("{:<9} {:>4} {:>16} {:>12}", "Month", "Days", "Amount", "Per day");
    println!("{}", "─".repeat(44));
    let mut expected: Option<YearMonth> = None;
    for budget in &budgets {
        if let Some(gap_start) = expected.filter(|m| *m < budget.year_month) {
            println!("{:<9} (no budget until {})", gap_start.to_string(), budget.year_month);
        }
        expected = Some(budget.year_month.next());
        println!(
            "{:<9} {:>4} {:>16} {:>12}",
            budget.year_month.to_string(),
            budget.year_month.days_in_month(),
            format_amount(budget.amount),
            format_amount(budget.daily_amount()),
        );
    }
    Ok(())
}

fn cli_import(args: &[String], db_path: &Path) -> Result<()> {
    let Some(file_path) = args.first() else {
        anyhow::bail!("Usage: budgetquery import <file.csv>");
    };
    let path = PathBuf::from(shellexpand(file_path));
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let budgets = BudgetCsv::read(&path)?;
    if budgets.is_empty() {
        println!("No budgets found in {file_path}");
        return Ok(());
    }

    let mut db = Database::open(db_path)?;
    let count = db.upsert_budgets_batch(&budgets)?;
    println!("Imported {count} budgets");
    Ok(())
}

fn cli_export(args: &[String], db_path: &Path) -> Result<()> {
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| "budgetquery-export.csv".to_string());

    let db = Database::open(db_path)?;
    let budgets = db.get_all_budgets()?;
    let count = BudgetCsv::write(Path::new(&output_path), &budgets)?;
    println!("Exported {count} budgets to {output_path}");
    Ok(())
}

/// Arguments that are neither flags nor the value of a flag in `valued_flags`.
fn positional_args<'a>(args: &'a [String], valued_flags: &[&str]) -> Vec<&'a String> {
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if valued_flags.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            positional.push(arg);
        }
    }
    positional
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// A query endpoint: either a calendar date, or a whole month resolved with
/// `day_of` to its first or last day.
fn parse_bound(s: &str, day_of: fn(&YearMonth) -> Option<NaiveDate>) -> Result<NaiveDate> {
    if let Ok(year_month) = YearMonth::from_str(s) {
        return day_of(&year_month).with_context(|| format!("Month out of range: {s}"));
    }
    parse_date(s)
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = s[..4].parse()?;
        let month: u32 = s[4..6].parse()?;
        let day: u32 = s[6..].parse()?;
        return NaiveDate::from_ymd_opt(year, month, day)
            .with_context(|| format!("Not a calendar date: {s}"));
    }
    for fmt in &["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    anyhow::bail!("Could not parse date: {s}")
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
