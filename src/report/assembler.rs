// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Composes engine output into the bundles the UI layer consumes: the
//! print-report composite, gap-filled trend series, and the CSV text export.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::models::{DateRange, TxType};
use crate::report::engine::{
    self, AdvancedStatistics, CategoryTotal, DayOfWeekStat, TimeOfDayStat, TopTransaction,
    TrendPoint,
};
use crate::store;
use crate::utils::{month_after, month_key, month_start};

/// Expands a possibly-sparse monthly series to exactly `count` entries, one
/// per month starting at `start`'s month, synthesizing zero months where the
/// input has none. Months already present are carried over untouched, so
/// applying this twice changes nothing.
pub fn fill_missing_months(series: Vec<TrendPoint>, start: NaiveDate, count: u32) -> Vec<TrendPoint> {
    let mut filled = Vec::with_capacity(count as usize);
    let mut cursor = month_start(start);
    for _ in 0..count {
        let key = month_key(cursor);
        match series.iter().find(|p| p.month == key) {
            Some(p) => filled.push(p.clone()),
            None => filled.push(TrendPoint::empty(key)),
        }
        cursor = month_after(cursor);
    }
    filled
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub generated_at: NaiveDate,
    pub statistics: AdvancedStatistics,
    pub expense_by_category: Vec<CategoryTotal>,
    pub income_by_category: Vec<CategoryTotal>,
    pub top_expenses: Vec<TopTransaction>,
    pub top_incomes: Vec<TopTransaction>,
    pub monthly_trend: Vec<TrendPoint>,
    pub expense_by_day: Vec<DayOfWeekStat>,
    pub expense_by_time: Vec<TimeOfDayStat>,
}

/// One bundle with everything the printable report shows. Pure composition;
/// each section degrades on its own if its query fails.
pub fn generate_print_report(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
    today: NaiveDate,
) -> PrintReport {
    PrintReport {
        start: range.start,
        end: range.end,
        generated_at: today,
        statistics: engine::advanced_statistics(conn, user_id, range),
        expense_by_category: engine::expense_by_category(conn, user_id, range),
        income_by_category: engine::income_by_category(conn, user_id, range),
        top_expenses: engine::top_transactions(conn, user_id, range, TxType::Expense, 10),
        top_incomes: engine::top_transactions(conn, user_id, range, TxType::Income, 10),
        monthly_trend: engine::monthly_trend(conn, user_id, 6, today),
        expense_by_day: engine::expense_by_day_of_week(conn, user_id, range),
        expense_by_time: engine::expense_by_time_of_day(conn, user_id, range),
    }
}

pub const CSV_HEADER: &str = "Date,Category,Description,Amount,Type";

/// CSV text for every transaction in range, newest first. The two free-text
/// columns are always quoted (embedded quotes doubled); date and amount stay
/// bare. The caller owns writing the text anywhere.
pub fn export_csv(conn: &Connection, user_id: i64, range: DateRange) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    let txs = match store::list_transactions(conn, user_id, range, None) {
        Ok(txs) => txs,
        Err(err) => {
            tracing::error!(error = %err, "csv export query failed, emitting header only");
            return out;
        }
    };
    for tx in txs {
        out.push_str(&format!(
            "{},{},{},{:.2},{}\n",
            tx.date,
            quoted(tx.category.as_deref().unwrap_or("")),
            quoted(tx.description.as_deref().unwrap_or("")),
            tx.amount,
            tx.kind.label(),
        ));
    }
    out
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
