// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, ensure};
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::models::TxType;
use crate::recurring::run_due_rules;
use crate::store;
use crate::utils::{parse_date, parse_decimal, pretty_table};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("run", sub)) => run(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    ensure!(amount > Decimal::ZERO, "Amount must be positive");
    let day = *sub.get_one::<u32>("day").unwrap();
    ensure!((1..=31).contains(&day), "Day must be between 1 and 31");

    let name = sub.get_one::<String>("category").unwrap();
    let cat = store::find_category(conn, user_id, name)?
        .with_context(|| format!("Category '{}' not found", name))?;
    // Automatic postings are always expenses.
    ensure!(
        cat.kind == TxType::Expense,
        "Recurring rules need an expense category, '{}' is income",
        cat.name
    );

    let description = sub.get_one::<String>("description").map(|s| s.as_str());
    let id = store::insert_recurring_rule(conn, user_id, cat.id, amount, description, day)?;
    println!(
        "Added recurring rule #{}: {} in '{}' on day {}",
        id, amount, cat.name, day
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let mut data = Vec::new();
    for rule in store::list_recurring_rules(conn, user_id)? {
        let category = store::get_category(conn, rule.category_id)?
            .map(|c| c.name)
            .unwrap_or_default();
        data.push(vec![
            rule.id.to_string(),
            category,
            format!("{:.2}", rule.amount),
            rule.day_of_month.to_string(),
            rule.last_executed
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!(
        "{}",
        pretty_table(&["Id", "Category", "Amount", "Day", "Last run"], data)
    );
    Ok(())
}

fn run(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user_id = *sub.get_one::<i64>("user").unwrap();
    let today = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => Utc::now().date_naive(),
    };
    let posted = run_due_rules(conn, user_id, today);
    println!("Posted {} recurring transaction(s)", posted);
    Ok(())
}
