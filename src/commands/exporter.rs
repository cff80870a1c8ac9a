// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

use crate::models::DateRange;
use crate::report::assembler;
use crate::store;
use crate::utils::parse_date;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("report", sub)) => export_report(conn, sub),
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

/// Period report in the fixed CSV layout; the assembler builds the text,
/// this command owns the file.
fn export_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let start = parse_date(sub.get_one::<String>("start").unwrap())?;
    let end = parse_date(sub.get_one::<String>("end").unwrap())?;
    let out = sub.get_one::<String>("out").unwrap();

    let text = assembler::export_csv(conn, user_id, DateRange::new(start, end));
    std::fs::write(out, text)?;
    println!("Exported report CSV to {}", out);
    Ok(())
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let txs = store::all_transactions(conn, user_id)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "category", "description", "amount", "type"])?;
            for t in txs {
                wtr.write_record([
                    t.date.to_string(),
                    t.category.unwrap_or_default(),
                    t.description.unwrap_or_default(),
                    format!("{:.2}", t.amount),
                    t.kind.label().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for t in txs {
                items.push(json!({
                    "date": t.date.to_string(),
                    "category": t.category,
                    "description": t.description,
                    "amount": format!("{:.2}", t.amount),
                    "type": t.kind.label(),
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            bail!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
