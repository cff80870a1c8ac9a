// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

use crate::models::{DateRange, TxType};
use crate::report::{assembler, engine};
use crate::store;
use crate::utils::{maybe_print_json, parse_date, parse_tx_type, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("categories", sub)) => categories(conn, sub)?,
        Some(("trend", sub)) => trend(conn, sub)?,
        Some(("by-day", sub)) => by_day(conn, sub)?,
        Some(("by-time", sub)) => by_time(conn, sub)?,
        Some(("top", sub)) => top(conn, sub)?,
        Some(("stats", sub)) => stats(conn, sub)?,
        Some(("overview", sub)) => overview(conn, sub)?,
        Some(("print", sub)) => print_report(conn, sub)?,
        Some(("months", sub)) => months(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn user_of(sub: &clap::ArgMatches) -> i64 {
    *sub.get_one::<i64>("user").unwrap()
}

fn range_of(sub: &clap::ArgMatches) -> Result<DateRange> {
    let start = parse_date(sub.get_one::<String>("start").unwrap())?;
    let end = parse_date(sub.get_one::<String>("end").unwrap())?;
    Ok(DateRange::new(start, end))
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = engine::monthly_summary(conn, user_of(sub), range_of(sub)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let row = vec![
            format!("{:.2}", data.income),
            format!("{:.2}", data.expense),
            format!("{:.2}", data.balance),
        ];
        println!(
            "{}",
            pretty_table(&["Income", "Expense", "Balance"], vec![row])
        );
    }
    Ok(())
}

fn categories(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let kind = parse_tx_type(sub.get_one::<String>("type").unwrap())?;
    let user = user_of(sub);
    let range = range_of(sub)?;
    let data = match kind {
        TxType::Expense => engine::expense_by_category(conn, user, range),
        TxType::Income => engine::income_by_category(conn, user, range),
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    format!("{:.2}", c.amount),
                    c.count.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Amount", "Count"], rows));
    }
    Ok(())
}

fn trend(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let months = *sub.get_one::<u32>("months").unwrap();
    let today = Utc::now().date_naive();
    let data = engine::monthly_trend(conn, user_of(sub), months, today);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.month.clone(),
                    format!("{:.2}", p.income),
                    format!("{:.2}", p.expense),
                    format!("{:.2}", p.balance),
                    format!("{:.2}", p.savings_rate),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Month", "Income", "Expense", "Balance", "Savings %"],
                rows,
            )
        );
    }
    Ok(())
}

fn by_day(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = engine::expense_by_day_of_week(conn, user_of(sub), range_of(sub)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|d| {
                vec![
                    d.day.clone(),
                    format!("{:.2}", d.amount),
                    d.count.to_string(),
                    format!("{:.2}", d.avg_amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Day", "Total", "Count", "Average"], rows)
        );
    }
    Ok(())
}

fn by_time(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = engine::expense_by_time_of_day(conn, user_of(sub), range_of(sub)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|t| {
                vec![
                    t.period.clone(),
                    format!("{:.2}", t.amount),
                    t.count.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Period", "Total", "Count"], rows));
    }
    Ok(())
}

fn top(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let kind = parse_tx_type(sub.get_one::<String>("type").unwrap())?;
    let limit = *sub.get_one::<usize>("limit").unwrap();
    let data = engine::top_transactions(conn, user_of(sub), range_of(sub)?, kind, limit);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    t.category.clone().unwrap_or_default(),
                    t.description.clone().unwrap_or_default(),
                    format!("{:.2}", t.amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Category", "Description", "Amount"], rows)
        );
    }
    Ok(())
}

fn fmt_date(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = engine::advanced_statistics(conn, user_of(sub), range_of(sub)?);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = vec![
            vec!["Income".into(), format!("{:.2}", data.income)],
            vec!["Expense".into(), format!("{:.2}", data.expense)],
            vec!["Balance".into(), format!("{:.2}", data.balance)],
            vec!["Transactions".into(), data.total_count.to_string()],
            vec![
                "Avg income/tx".into(),
                format!("{:.2}", data.avg_income_per_transaction),
            ],
            vec![
                "Avg expense/tx".into(),
                format!("{:.2}", data.avg_expense_per_transaction),
            ],
            vec!["Savings rate %".into(), format!("{:.2}", data.savings_rate)],
            vec!["First transaction".into(), fmt_date(data.first_date)],
            vec!["Last transaction".into(), fmt_date(data.last_date)],
            vec![
                "Biggest expense on".into(),
                fmt_date(data.highest_expense_date),
            ],
            vec![
                "Biggest income on".into(),
                fmt_date(data.highest_income_date),
            ],
            vec!["Active days".into(), data.active_days.to_string()],
            vec![
                "Activity rate %".into(),
                format!("{:.2}", data.activity_rate),
            ],
        ];
        println!("{}", pretty_table(&["Metric", "Value"], rows));
    }
    Ok(())
}

fn overview(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = Utc::now().date_naive();
    let data = engine::quick_overview(conn, user_of(sub), today);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = vec![
            vec![
                "This month".into(),
                format!("{:.2}", data.current_month.income),
                format!("{:.2}", data.current_month.expense),
                format!("{:.2}", data.current_month.balance),
            ],
            vec![
                "Last month".into(),
                format!("{:.2}", data.last_month.income),
                format!("{:.2}", data.last_month.expense),
                format!("{:.2}", data.last_month.balance),
            ],
            vec![
                "Change %".into(),
                format!("{:.2}", data.income_change),
                format!("{:.2}", data.expense_change),
                String::new(),
            ],
        ];
        println!(
            "{}",
            pretty_table(&["", "Income", "Expense", "Balance"], rows)
        );
        let recent = data
            .recent_transactions
            .iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    t.category.clone().unwrap_or_default(),
                    format!("{:.2}", t.amount),
                    t.kind.label().to_string(),
                ]
            })
            .collect();
        println!("Last 7 days:");
        println!(
            "{}",
            pretty_table(&["Date", "Category", "Amount", "Type"], recent)
        );
    }
    Ok(())
}

fn print_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = Utc::now().date_naive();
    let report = assembler::generate_print_report(conn, user_of(sub), range_of(sub)?, today);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        // Text mode prints the same bundle as pretty JSON; the report is a
        // machine-facing composite, the UI renders it.
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn months(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = store::months_with_data(conn, user_of(sub))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data.into_iter().map(|m| vec![m]).collect();
        println!("{}", pretty_table(&["Month"], rows));
    }
    Ok(())
}
