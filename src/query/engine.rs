use chrono::{Datelike, NaiveDate};
use log::debug;
use rust_decimal::Decimal;

use crate::models::{MonthlyBudget, YearMonth};

/// One month's contribution to a query total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthShare {
    pub year_month: YearMonth,
    pub days_covered: u32,
    pub days_in_month: u32,
    pub amount: Decimal,
}

impl MonthShare {
    fn of(budget: &MonthlyBudget, days_covered: u32) -> Self {
        let days_in_month = budget.year_month.days_in_month();
        let amount = if days_covered == days_in_month {
            budget.amount
        } else {
            prorate_amount(budget.amount, days_covered, days_in_month)
        };
        Self {
            year_month: budget.year_month,
            days_covered,
            days_in_month,
            amount,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.days_covered < self.days_in_month
    }
}

/// `amount * days / dim`, dividing first when the product would overflow.
fn prorate_amount(amount: Decimal, days: u32, dim: u32) -> Decimal {
    let days = Decimal::from(days);
    let dim = Decimal::from(dim);
    match amount.checked_mul(days) {
        Some(product) => product / dim,
        None => (amount / dim).saturating_mul(days),
    }
}

/// Sum of shares, saturating at `Decimal::MAX`.
pub fn total(shares: &[MonthShare]) -> Decimal {
    shares
        .iter()
        .fold(Decimal::ZERO, |sum, share| sum.saturating_add(share.amount))
}

/// Which part of a month a multi-month range covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coverage {
    /// From the start date to the end of the month.
    FromStart,
    /// From the first of the month to the end date.
    UntilEnd,
    Whole,
}

impl Coverage {
    fn classify(month: YearMonth, first: YearMonth, last: YearMonth) -> Self {
        if month == first {
            Self::FromStart
        } else if month == last {
            Self::UntilEnd
        } else {
            Self::Whole
        }
    }

    fn days(self, month: YearMonth, start: NaiveDate, end: NaiveDate) -> u32 {
        let dim = month.days_in_month();
        match self {
            Self::FromStart => dim - start.day() + 1,
            Self::UntilEnd => end.day(),
            Self::Whole => dim,
        }
    }
}

/// Total budget attributable to the inclusive range `start..=end`.
///
/// Never fails: an inverted range, an empty collection, or months without a
/// budget all contribute zero.
pub fn prorate(start: NaiveDate, end: NaiveDate, budgets: &[MonthlyBudget]) -> Decimal {
    total(&breakdown(start, end, budgets))
}

/// Per-month contributions to [`prorate`], in chronological order.
pub fn breakdown(start: NaiveDate, end: NaiveDate, budgets: &[MonthlyBudget]) -> Vec<MonthShare> {
    if start > end || budgets.is_empty() {
        debug!(
            "Nothing to prorate for {start}..={end} ({} budgets)",
            budgets.len()
        );
        return Vec::new();
    }

    let first = YearMonth::of(start);
    let last = YearMonth::of(end);

    if start == end {
        debug!("Single-day query for {start}");
        return find_month(budgets, first)
            .map(|budget| vec![MonthShare::of(budget, 1)])
            .unwrap_or_default();
    }

    if first == last {
        debug!("Same-month query for {first}");
        let days = end.day() - start.day() + 1;
        return find_month(budgets, first)
            .map(|budget| vec![MonthShare::of(budget, days)])
            .unwrap_or_default();
    }

    // First match per month wins, same as the single-month lookups.
    let mut selected: Vec<&MonthlyBudget> = budgets
        .iter()
        .filter(|b| (first..=last).contains(&b.year_month))
        .collect();
    selected.sort_by_key(|b| b.year_month);
    selected.dedup_by_key(|b| b.year_month);
    debug!(
        "Multi-month query {first}..={last}: {} of {} budgets in range",
        selected.len(),
        budgets.len()
    );

    if let [only] = selected.as_slice() {
        let coverage = Coverage::classify(only.year_month, first, last);
        debug!("Only {} has a budget, counted as {coverage:?}", only.year_month);
        let days = coverage.days(only.year_month, start, end);
        return vec![MonthShare::of(only, days)];
    }

    selected
        .into_iter()
        .map(|budget| {
            let coverage = Coverage::classify(budget.year_month, first, last);
            MonthShare::of(budget, coverage.days(budget.year_month, start, end))
        })
        .collect()
}

fn find_month(budgets: &[MonthlyBudget], month: YearMonth) -> Option<&MonthlyBudget> {
    budgets.iter().find(|b| b.year_month == month)
}
