mod engine;
mod source;

pub(crate) use engine::total;
pub(crate) use source::{BudgetQuery, BudgetSource};
