// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tallybook::db;
use tallybook::models::DateRange;
use tallybook::report::engine::{self, TrendPoint};
use tallybook::report::assembler;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute("INSERT INTO users(id, username) VALUES (1, 'alice')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO categories(name, type, user_id) VALUES ('Food', 'EXPENSE', 1)",
        [],
    )
    .unwrap();
    conn
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn range(start: &str, end: &str) -> DateRange {
    DateRange::new(date(start), date(end))
}

fn cat_id(conn: &Connection, name: &str) -> i64 {
    conn.query_row(
        "SELECT id FROM categories WHERE name=?1",
        params![name],
        |r| r.get(0),
    )
    .unwrap()
}

fn insert_tx(conn: &Connection, cat: &str, amount: &str, d: &str, kind: &str, desc: Option<&str>) {
    conn.execute(
        "INSERT INTO transactions(user_id, category_id, amount, description, date, type)
         VALUES (1, ?1, ?2, ?3, ?4, ?5)",
        params![cat_id(conn, cat), amount, desc, d, kind],
    )
    .unwrap();
}

#[test]
fn trend_always_returns_exactly_n_months() {
    let conn = setup();
    insert_tx(&conn, "Salary", "1000", "2024-01-15", "INCOME", None);
    insert_tx(&conn, "Food", "150", "2024-01-20", "EXPENSE", None);

    let trend = engine::monthly_trend(&conn, 1, 6, date("2024-03-15"));
    assert_eq!(trend.len(), 6);
    let months: Vec<&str> = trend.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(
        months,
        ["2023-10", "2023-11", "2023-12", "2024-01", "2024-02", "2024-03"]
    );
    let jan = &trend[3];
    assert_eq!(jan.income, dec("1000"));
    assert_eq!(jan.expense, dec("150"));
    assert_eq!(jan.balance, dec("850"));
    assert_eq!(jan.income_count, 1);
    assert_eq!(jan.expense_count, 1);
    assert_eq!(jan.savings_rate, dec("85.00"));
    assert!(trend[0].income.is_zero());
    assert!(trend[5].income.is_zero());
    assert_eq!(trend[5].savings_rate, Decimal::ZERO);
}

#[test]
fn trend_spans_year_boundaries() {
    let conn = setup();
    let trend = engine::monthly_trend(&conn, 1, 3, date("2024-01-10"));
    let months: Vec<&str> = trend.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(months, ["2023-11", "2023-12", "2024-01"]);
}

#[test]
fn fill_missing_months_is_idempotent() {
    let sparse = vec![
        TrendPoint {
            month: "2024-02".into(),
            income: dec("10"),
            expense: dec("4"),
            balance: dec("6"),
            income_count: 1,
            expense_count: 1,
            savings_rate: dec("60.00"),
        },
    ];
    let once = assembler::fill_missing_months(sparse, date("2024-01-01"), 4);
    let twice = assembler::fill_missing_months(once.clone(), date("2024-01-01"), 4);
    assert_eq!(once, twice);
    assert_eq!(once.len(), 4);
    let months: Vec<&str> = once.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(months, ["2024-01", "2024-02", "2024-03", "2024-04"]);
    assert_eq!(once[1].income, dec("10"));
    assert!(once[0].income.is_zero());
    assert!(once[2].income.is_zero());
}

#[test]
fn fill_missing_months_keeps_existing_entries_untouched() {
    let sparse = vec![
        TrendPoint::empty("2024-01".into()),
        TrendPoint {
            month: "2024-03".into(),
            income: dec("7"),
            expense: Decimal::ZERO,
            balance: dec("7"),
            income_count: 2,
            expense_count: 0,
            savings_rate: dec("100.00"),
        },
    ];
    let filled = assembler::fill_missing_months(sparse, date("2024-01-01"), 3);
    assert_eq!(filled.len(), 3);
    assert_eq!(filled[0].month, "2024-01");
    assert_eq!(filled[2].month, "2024-03");
    assert_eq!(filled[2].income_count, 2);
    assert_eq!(filled[2].savings_rate, dec("100.00"));
}

#[test]
fn percentage_change_edge_cases() {
    assert_eq!(
        engine::percentage_change(Decimal::ZERO, Decimal::ZERO),
        Decimal::ZERO
    );
    assert_eq!(
        engine::percentage_change(dec("100"), Decimal::ZERO),
        dec("100")
    );
    assert_eq!(engine::percentage_change(dec("150"), dec("100")), dec("50.00"));
    assert_eq!(engine::percentage_change(dec("50"), dec("100")), dec("-50.00"));
    assert_eq!(engine::percentage_change(dec("100"), dec("300")), dec("-66.67"));
}

#[test]
fn quick_overview_compares_against_previous_month() {
    let conn = setup();
    insert_tx(&conn, "Salary", "100", "2024-01-10", "INCOME", None);
    insert_tx(&conn, "Salary", "200", "2024-02-05", "INCOME", None);
    insert_tx(&conn, "Food", "50", "2024-02-12", "EXPENSE", Some("veg"));

    let today = date("2024-02-15");
    let overview = engine::quick_overview(&conn, 1, today);
    assert_eq!(overview.current_month.income, dec("200"));
    assert_eq!(overview.last_month.income, dec("100"));
    assert_eq!(overview.income_change, dec("100.00"));
    // No expenses last month, some this month: change pegs at 100.
    assert_eq!(overview.expense_change, dec("100"));
    assert_eq!(overview.top_incomes.len(), 1);
    assert_eq!(overview.top_expenses.len(), 1);
    assert_eq!(overview.top_expenses[0].amount, dec("50"));
    // Only the expense of Feb 12 falls inside the trailing week.
    assert_eq!(overview.recent_transactions.len(), 1);
    assert_eq!(overview.recent_transactions[0].date, date("2024-02-12"));
}

#[test]
fn print_report_bundles_every_section() {
    let conn = setup();
    insert_tx(&conn, "Salary", "1000", "2024-01-01", "INCOME", None);
    insert_tx(&conn, "Food", "100", "2024-01-05", "EXPENSE", Some("dinner"));
    insert_tx(&conn, "Food", "50", "2024-01-10", "EXPENSE", Some("lunch"));

    let today = date("2024-01-31");
    let report =
        assembler::generate_print_report(&conn, 1, range("2024-01-01", "2024-01-31"), today);
    assert_eq!(report.start, date("2024-01-01"));
    assert_eq!(report.end, date("2024-01-31"));
    assert_eq!(report.generated_at, today);
    assert_eq!(report.statistics.balance, dec("850"));
    assert_eq!(report.expense_by_category.len(), 1);
    assert_eq!(report.income_by_category.len(), 1);
    assert_eq!(report.top_expenses.len(), 2);
    assert_eq!(report.top_incomes.len(), 1);
    assert_eq!(report.monthly_trend.len(), 6);
    assert_eq!(report.monthly_trend[5].month, "2024-01");
    assert_eq!(report.expense_by_day.len(), 2);
}

#[test]
fn csv_export_matches_fixed_layout() {
    let conn = setup();
    insert_tx(&conn, "Salary", "1000", "2024-01-01", "INCOME", Some("pay"));
    insert_tx(&conn, "Food", "100", "2024-01-05", "EXPENSE", Some("dinner"));
    insert_tx(&conn, "Food", "50", "2024-01-10", "EXPENSE", Some("lunch"));

    let text = assembler::export_csv(&conn, 1, range("2024-01-01", "2024-01-31"));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Date,Category,Description,Amount,Type");
    // Newest first; amount bare, free-text columns quoted.
    assert_eq!(lines[1], "2024-01-10,\"Food\",\"lunch\",50.00,Expense");
    assert_eq!(lines[2], "2024-01-05,\"Food\",\"dinner\",100.00,Expense");
    assert_eq!(lines[3], "2024-01-01,\"Salary\",\"pay\",1000.00,Income");
}

#[test]
fn csv_export_doubles_embedded_quotes() {
    let conn = setup();
    insert_tx(
        &conn,
        "Food",
        "12.30",
        "2024-01-05",
        "EXPENSE",
        Some("say \"cheese\""),
    );
    let text = assembler::export_csv(&conn, 1, range("2024-01-01", "2024-01-31"));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[1],
        "2024-01-05,\"Food\",\"say \"\"cheese\"\"\",12.30,Expense"
    );
}

#[test]
fn csv_export_degrades_to_header_on_store_failure() {
    let conn = setup();
    conn.execute_batch("DROP TABLE transactions").unwrap();
    let text = assembler::export_csv(&conn, 1, range("2024-01-01", "2024-01-31"));
    assert_eq!(text, "Date,Category,Description,Amount,Type\n");
}
