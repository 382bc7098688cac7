#![allow(clippy::unwrap_used)]

use super::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::query::BudgetQuery;

fn ym(s: &str) -> YearMonth {
    s.parse().unwrap()
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_empty() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_all_budgets().unwrap().is_empty());
}

#[test]
fn test_reopen_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("budgets.db");
    {
        let db = Database::open(&path).unwrap();
        db.upsert_budget(&MonthlyBudget::new(ym("202401"), dec!(310)))
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    let all = db.get_all_budgets().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].amount, dec!(310));
}

// ── Budget CRUD ───────────────────────────────────────────────

#[test]
fn test_budget_crud() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .upsert_budget(&MonthlyBudget::new(ym("202401"), dec!(500)))
        .unwrap();
    assert!(id > 0);

    let fetched = db.get_budget(ym("202401")).unwrap().unwrap();
    assert_eq!(fetched.id, Some(id));
    assert_eq!(fetched.amount, dec!(500));

    // Upsert replaces the amount for the same month
    let same_id = db
        .upsert_budget(&MonthlyBudget::new(ym("202401"), dec!(600)))
        .unwrap();
    assert_eq!(same_id, id);
    assert_eq!(db.get_all_budgets().unwrap().len(), 1);
    assert_eq!(
        db.get_budget(ym("202401")).unwrap().unwrap().amount,
        dec!(600)
    );

    assert!(db.delete_budget(ym("202401")).unwrap());
    assert!(db.get_budget(ym("202401")).unwrap().is_none());
}

#[test]
fn test_delete_missing_budget() {
    let db = Database::open_in_memory().unwrap();
    assert!(!db.delete_budget(ym("209912")).unwrap());
}

#[test]
fn test_get_budget_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_budget(ym("202402")).unwrap().is_none());
}

#[test]
fn test_decimal_precision_preserved() {
    let db = Database::open_in_memory().unwrap();
    db.upsert_budget(&MonthlyBudget::new(ym("202401"), dec!(1234.5678)))
        .unwrap();
    assert_eq!(
        db.get_budget(ym("202401")).unwrap().unwrap().amount,
        dec!(1234.5678)
    );
}

#[test]
fn test_get_all_sorted_by_month() {
    let db = Database::open_in_memory().unwrap();
    for m in ["202403", "202312", "202401"] {
        db.upsert_budget(&MonthlyBudget::new(ym(m), dec!(1))).unwrap();
    }
    let months: Vec<String> = db
        .get_all_budgets()
        .unwrap()
        .iter()
        .map(|b| b.year_month.compact())
        .collect();
    assert_eq!(months, vec!["202312", "202401", "202403"]);
}

#[test]
fn test_batch_upsert() {
    let mut db = Database::open_in_memory().unwrap();
    let budgets = vec![
        MonthlyBudget::new(ym("202401"), dec!(310)),
        MonthlyBudget::new(ym("202402"), dec!(400)),
        MonthlyBudget::new(ym("202401"), dec!(620)),
    ];
    assert_eq!(db.upsert_budgets_batch(&budgets).unwrap(), 3);
    let all = db.get_all_budgets().unwrap();
    assert_eq!(all.len(), 2);
    // Later rows in a batch overwrite earlier ones
    assert_eq!(all[0].amount, dec!(620));
}

#[test]
fn test_corrupt_amount_is_an_error() {
    let db = Database::open_in_memory().unwrap();
    db.conn
        .execute(
            "INSERT INTO budgets (year_month, amount, updated_at) VALUES ('202401', 'abc', '')",
            [],
        )
        .unwrap();
    let err = db.get_all_budgets().unwrap_err();
    assert!(format!("{err:#}").contains("bad amount"));
}

// ── As a budget source ────────────────────────────────────────

#[test]
fn test_query_against_database() {
    let mut db = Database::open_in_memory().unwrap();
    db.upsert_budgets_batch(&[
        MonthlyBudget::new(ym("202403"), dec!(3100)),
        MonthlyBudget::new(ym("202401"), dec!(310)),
        MonthlyBudget::new(ym("202402"), dec!(400)),
    ])
    .unwrap();

    let query = BudgetQuery::new(&db);
    let start = NaiveDate::from_ymd_opt(2024, 1, 22).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert_eq!(query.query(start, end).unwrap(), dec!(600));
}

#[test]
fn test_query_against_empty_database() {
    let db = Database::open_in_memory().unwrap();
    let query = BudgetQuery::new(&db);
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(query.query(day, day).unwrap(), Decimal::ZERO);
}
