use rust_decimal::Decimal;

use super::YearMonth;

/// The amount allocated to one whole calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyBudget {
    pub id: Option<i64>,
    pub year_month: YearMonth,
    pub amount: Decimal,
}

impl MonthlyBudget {
    pub fn new(year_month: YearMonth, amount: Decimal) -> Self {
        Self {
            id: None,
            year_month,
            amount,
        }
    }

    /// Share of the monthly amount for one day of the month.
    pub fn daily_amount(&self) -> Decimal {
        self.amount / Decimal::from(self.year_month.days_in_month())
    }
}
