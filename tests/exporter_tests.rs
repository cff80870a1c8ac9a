// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, params};
use serde_json::json;
use tallybook::{cli, commands::exporter, db};
use tempfile::tempdir;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute("INSERT INTO users(id, username) VALUES (1, 'alice')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO categories(id, name, type, user_id) VALUES (100, 'Food', 'EXPENSE', 1)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(user_id, category_id, amount, description, date, type)
         VALUES (1, 100, '12.34', 'Corner shop', '2024-01-02', 'EXPENSE')",
        params![],
    )
    .unwrap();
    conn
}

fn export_matches(args: &[&str]) -> clap::ArgMatches {
    let matches = cli::build_cli().get_matches_from(args);
    match matches.subcommand() {
        Some(("export", m)) => m.clone(),
        _ => panic!("no export subcommand"),
    }
}

#[test]
fn export_report_writes_csv_file() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("report.csv");
    let out_str = out_path.to_string_lossy().to_string();

    let m = export_matches(&[
        "tallybook", "export", "report", "--user", "1", "--start", "2024-01-01", "--end",
        "2024-01-31", "--out", &out_str,
    ]);
    exporter::handle(&conn, &m).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Date,Category,Description,Amount,Type");
    assert_eq!(lines[1], "2024-01-02,\"Food\",\"Corner shop\",12.34,Expense");
}

#[test]
fn export_transactions_streams_pretty_json() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    let m = export_matches(&[
        "tallybook",
        "export",
        "transactions",
        "--user",
        "1",
        "--format",
        "json",
        "--out",
        &out_str,
    ]);
    exporter::handle(&conn, &m).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "date": "2024-01-02",
                "category": "Food",
                "description": "Corner shop",
                "amount": "12.34",
                "type": "Expense"
            }
        ])
    );
}

#[test]
fn export_transactions_writes_csv() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    let m = export_matches(&[
        "tallybook",
        "export",
        "transactions",
        "--user",
        "1",
        "--format",
        "csv",
        "--out",
        &out_str,
    ]);
    exporter::handle(&conn, &m).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "date,category,description,amount,type");
    assert_eq!(lines[1], "2024-01-02,Food,Corner shop,12.34,Expense");
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let m = export_matches(&[
        "tallybook",
        "export",
        "transactions",
        "--user",
        "1",
        "--format",
        "xml",
        "--out",
        &out_str,
    ]);
    assert!(exporter::handle(&conn, &m).is_err());
    assert!(!out_path.exists());
}
