mod budget;
mod year_month;

pub use budget::MonthlyBudget;
pub use year_month::YearMonth;
