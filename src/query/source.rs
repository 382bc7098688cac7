use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::engine::{self, MonthShare};
use crate::models::MonthlyBudget;

/// Supplies every known monthly budget, in no particular order and with no
/// guarantee that any given month is present.
pub trait BudgetSource {
    fn get_all(&self) -> Result<Vec<MonthlyBudget>>;
}

impl BudgetSource for [MonthlyBudget] {
    fn get_all(&self) -> Result<Vec<MonthlyBudget>> {
        Ok(self.to_vec())
    }
}

impl BudgetSource for Vec<MonthlyBudget> {
    fn get_all(&self) -> Result<Vec<MonthlyBudget>> {
        self.as_slice().get_all()
    }
}

impl<S: BudgetSource + ?Sized> BudgetSource for &S {
    fn get_all(&self) -> Result<Vec<MonthlyBudget>> {
        (**self).get_all()
    }
}

/// Answers date-range queries against a [`BudgetSource`], loading the
/// budgets once per call.
pub struct BudgetQuery<S> {
    source: S,
}

impl<S: BudgetSource> BudgetQuery<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Errors only when the source itself fails to load.
    pub fn query(&self, start: NaiveDate, end: NaiveDate) -> Result<Decimal> {
        let budgets = self.load()?;
        Ok(engine::prorate(start, end, &budgets))
    }

    pub fn breakdown(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<MonthShare>> {
        let budgets = self.load()?;
        Ok(engine::breakdown(start, end, &budgets))
    }

    fn load(&self) -> Result<Vec<MonthlyBudget>> {
        self.source.get_all().context("Failed to load budgets")
    }
}
