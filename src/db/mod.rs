mod schema;

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::{MonthlyBudget, YearMonth};
use crate::query::BudgetSource;

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        debug!("Opened budget database at {}", path.display());
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            info!("Creating budget schema v{}", schema::CURRENT_VERSION);
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                debug!("Applying migration from v{from_version}");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Budgets ───────────────────────────────────────────────

    /// Insert a month's budget, or replace the amount if the month exists.
    pub(crate) fn upsert_budget(&self, budget: &MonthlyBudget) -> Result<i64> {
        let id = self.conn.query_row(
            "INSERT INTO budgets (year_month, amount, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(year_month) DO UPDATE SET amount = excluded.amount, updated_at = excluded.updated_at
             RETURNING id",
            params![
                budget.year_month.compact(),
                budget.amount.to_string(),
                chrono::Utc::now().to_rfc3339(),
            ],
            |row| row.get(0),
        )?;
        debug!("Stored budget {} = {}", budget.year_month, budget.amount);
        Ok(id)
    }

    /// Upsert many budgets in one transaction. Returns the number written.
    pub(crate) fn upsert_budgets_batch(&mut self, budgets: &[MonthlyBudget]) -> Result<usize> {
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO budgets (year_month, amount, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(year_month) DO UPDATE SET amount = excluded.amount, updated_at = excluded.updated_at",
            )?;
            for budget in budgets {
                stmt.execute(params![
                    budget.year_month.compact(),
                    budget.amount.to_string(),
                    now,
                ])?;
            }
        }
        tx.commit()?;
        info!("Stored {} budgets", budgets.len());
        Ok(budgets.len())
    }

    pub(crate) fn get_budget(&self, year_month: YearMonth) -> Result<Option<MonthlyBudget>> {
        let row: Option<(i64, String, String)> = self
            .conn
            .query_row(
                "SELECT id, year_month, amount FROM budgets WHERE year_month = ?1",
                params![year_month.compact()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        row.map(|(id, ym, amount)| budget_from_row(id, &ym, &amount))
            .transpose()
    }

    /// Every stored budget, oldest month first.
    pub(crate) fn get_all_budgets(&self) -> Result<Vec<MonthlyBudget>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, year_month, amount FROM budgets ORDER BY year_month")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut budgets = Vec::new();
        for row in rows {
            let (id, ym, amount) = row?;
            budgets.push(budget_from_row(id, &ym, &amount)?);
        }
        Ok(budgets)
    }

    /// Returns whether a budget was removed.
    pub(crate) fn delete_budget(&self, year_month: YearMonth) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM budgets WHERE year_month = ?1",
            params![year_month.compact()],
        )?;
        Ok(removed > 0)
    }
}

impl BudgetSource for Database {
    fn get_all(&self) -> Result<Vec<MonthlyBudget>> {
        self.get_all_budgets()
    }
}

fn budget_from_row(id: i64, year_month: &str, amount: &str) -> Result<MonthlyBudget> {
    let year_month = YearMonth::from_str(year_month)
        .with_context(|| format!("Budget row {id} has a bad month"))?;
    let amount = Decimal::from_str(amount)
        .with_context(|| format!("Budget row {id} has a bad amount '{amount}'"))?;
    Ok(MonthlyBudget {
        id: Some(id),
        year_month,
        amount,
    })
}

#[cfg(test)]
mod tests;
