// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail, ensure};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::models::{Category, DateRange, NewTransaction, Transaction, TxType};
use crate::store;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, parse_tx_type, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn resolve_category(conn: &Connection, user_id: i64, name: &str, kind: TxType) -> Result<Category> {
    let cat = store::find_category(conn, user_id, name)?
        .with_context(|| format!("Category '{}' not found", name))?;
    ensure!(
        cat.kind == kind,
        "Category '{}' is an {} category, not {}",
        cat.name,
        cat.kind.label().to_lowercase(),
        kind.label().to_lowercase()
    );
    Ok(cat)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    ensure!(amount > Decimal::ZERO, "Amount must be positive");
    let kind = parse_tx_type(sub.get_one::<String>("type").unwrap())?;
    let cat = resolve_category(conn, user_id, sub.get_one::<String>("category").unwrap(), kind)?;
    let description = sub.get_one::<String>("description").cloned();

    let id = store::insert_transaction(
        conn,
        &NewTransaction {
            user_id,
            category_id: cat.id,
            amount,
            description,
            date,
            kind,
        },
    )?;
    println!(
        "Recorded {} {} on {} in '{}' (#{})",
        kind.label().to_lowercase(),
        amount,
        date,
        cat.name,
        id
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let limit = sub.get_one::<usize>("limit").copied();

    let data = match (sub.get_one::<String>("start"), sub.get_one::<String>("end")) {
        (Some(start), Some(end)) => {
            let range = DateRange::new(parse_date(start)?, parse_date(end)?);
            store::list_transactions(conn, user_id, range, limit)?
        }
        (None, None) => store::recent_transactions(conn, user_id, limit.unwrap_or(50))?,
        _ => bail!("--start and --end must be given together"),
    };

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data.iter().map(tx_row).collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Category", "Description", "Amount", "Type"],
                rows,
            )
        );
    }
    Ok(())
}

fn tx_row(t: &Transaction) -> Vec<String> {
    vec![
        t.id.to_string(),
        t.date.to_string(),
        t.category.clone().unwrap_or_default(),
        t.description.clone().unwrap_or_default(),
        format!("{:.2}", t.amount),
        t.kind.label().to_string(),
    ]
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut tx = store::get_transaction(conn, user_id, id)?
        .with_context(|| format!("Transaction #{} not found", id))?;

    if let Some(date) = sub.get_one::<String>("date") {
        tx.date = parse_date(date)?;
    }
    if let Some(amount) = sub.get_one::<String>("amount") {
        tx.amount = parse_decimal(amount)?;
        ensure!(tx.amount > Decimal::ZERO, "Amount must be positive");
    }
    if let Some(kind) = sub.get_one::<String>("type") {
        tx.kind = parse_tx_type(kind)?;
    }
    if let Some(name) = sub.get_one::<String>("category") {
        let cat = resolve_category(conn, user_id, name, tx.kind)?;
        tx.category_id = cat.id;
        tx.category = Some(cat.name);
    } else {
        // Type may have changed out from under the existing category.
        let cat = store::get_category(conn, tx.category_id)?
            .with_context(|| format!("Category #{} not found", tx.category_id))?;
        ensure!(
            cat.kind == tx.kind,
            "Category '{}' is an {} category, not {}",
            cat.name,
            cat.kind.label().to_lowercase(),
            tx.kind.label().to_lowercase()
        );
    }
    if let Some(description) = sub.get_one::<String>("description") {
        tx.description = Some(description.clone());
    }

    ensure!(
        store::update_transaction(conn, &tx)?,
        "Transaction #{} not found",
        id
    );
    println!("Updated transaction #{}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let id = *sub.get_one::<i64>("id").unwrap();
    ensure!(
        store::delete_transaction(conn, user_id, id)?,
        "Transaction #{} not found",
        id
    );
    println!("Deleted transaction #{}", id);
    Ok(())
}
