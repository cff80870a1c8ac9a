// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, params};
use tallybook::{cli, commands::transactions, db};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute("INSERT INTO users(id, username) VALUES (1, 'alice')", [])
        .unwrap();
    conn
}

fn tx_matches(args: &[&str]) -> clap::ArgMatches {
    let matches = cli::build_cli().get_matches_from(args);
    match matches.subcommand() {
        Some(("tx", m)) => m.clone(),
        _ => panic!("no tx subcommand"),
    }
}

#[test]
fn add_records_a_transaction() {
    let conn = setup();
    let m = tx_matches(&[
        "tallybook",
        "tx",
        "add",
        "--user",
        "1",
        "--date",
        "2024-01-05",
        "--amount",
        "12.50",
        "--category",
        "Groceries",
        "--type",
        "expense",
        "--description",
        "weekly run",
    ]);
    transactions::handle(&conn, &m).unwrap();

    let (amount, kind): (String, String) = conn
        .query_row(
            "SELECT amount, type FROM transactions WHERE user_id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(amount, "12.50");
    assert_eq!(kind, "EXPENSE");
}

#[test]
fn add_rejects_non_positive_amount() {
    let conn = setup();
    let m = tx_matches(&[
        "tallybook",
        "tx",
        "add",
        "--user",
        "1",
        "--date",
        "2024-01-05",
        "--amount",
        "-3",
        "--category",
        "Groceries",
        "--type",
        "expense",
    ]);
    assert!(transactions::handle(&conn, &m).is_err());
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn add_rejects_category_type_mismatch() {
    let conn = setup();
    // Salary is a seeded income category; booking an expense against it
    // must fail at the entry layer.
    let m = tx_matches(&[
        "tallybook",
        "tx",
        "add",
        "--user",
        "1",
        "--date",
        "2024-01-05",
        "--amount",
        "10",
        "--category",
        "Salary",
        "--type",
        "expense",
    ]);
    assert!(transactions::handle(&conn, &m).is_err());
}

#[test]
fn add_rejects_unknown_category() {
    let conn = setup();
    let m = tx_matches(&[
        "tallybook",
        "tx",
        "add",
        "--user",
        "1",
        "--date",
        "2024-01-05",
        "--amount",
        "10",
        "--category",
        "Nope",
        "--type",
        "expense",
    ]);
    assert!(transactions::handle(&conn, &m).is_err());
}

#[test]
fn rm_only_touches_own_rows() {
    let conn = setup();
    conn.execute("INSERT INTO users(id, username) VALUES (2, 'bob')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO transactions(user_id, category_id, amount, date, type)
         VALUES (2, (SELECT id FROM categories WHERE name='Groceries'), '9', '2024-01-05', 'EXPENSE')",
        params![],
    )
    .unwrap();
    let id: i64 = conn.last_insert_rowid();

    let m = tx_matches(&[
        "tallybook",
        "tx",
        "rm",
        "--user",
        "1",
        "--id",
        &id.to_string(),
    ]);
    // Alice cannot delete Bob's transaction.
    assert!(transactions::handle(&conn, &m).is_err());
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 1);
}

#[test]
fn edit_updates_fields_in_place() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(user_id, category_id, amount, description, date, type)
         VALUES (1, (SELECT id FROM categories WHERE name='Groceries'), '20', 'old', '2024-01-05', 'EXPENSE')",
        params![],
    )
    .unwrap();
    let id = conn.last_insert_rowid();

    let m = tx_matches(&[
        "tallybook",
        "tx",
        "edit",
        "--user",
        "1",
        "--id",
        &id.to_string(),
        "--amount",
        "25.50",
        "--description",
        "new",
    ]);
    transactions::handle(&conn, &m).unwrap();

    let (amount, description): (String, String) = conn
        .query_row(
            "SELECT amount, description FROM transactions WHERE id=?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(amount, "25.50");
    assert_eq!(description, "new");
}

#[test]
fn edit_rejects_type_change_that_breaks_the_category() {
    let conn = setup();
    conn.execute(
        "INSERT INTO transactions(user_id, category_id, amount, date, type)
         VALUES (1, (SELECT id FROM categories WHERE name='Groceries'), '20', '2024-01-05', 'EXPENSE')",
        params![],
    )
    .unwrap();
    let id = conn.last_insert_rowid();

    let m = tx_matches(&[
        "tallybook",
        "tx",
        "edit",
        "--user",
        "1",
        "--id",
        &id.to_string(),
        "--type",
        "income",
    ]);
    assert!(transactions::handle(&conn, &m).is_err());
}
