// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Query contract over the ledger tables. Everything the report engine and
//! the recurring executor know about SQL lives here; callers get typed rows
//! and `Decimal` money back. Amounts are stored as TEXT and summed in Rust,
//! so no float arithmetic ever touches a balance.

use std::collections::HashMap;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{
    Category, DateRange, MonthToken, NewTransaction, RecurringRule, Transaction, TxType,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A stored amount that fails to parse, or is negative, counts as zero in
/// sums. A single bad row must not take down a whole report.
fn summable(raw: Option<String>) -> Decimal {
    match raw.and_then(|s| s.parse::<Decimal>().ok()) {
        Some(d) if d > Decimal::ZERO => d,
        _ => Decimal::ZERO,
    }
}

fn kind_from_column(idx: usize, raw: String) -> rusqlite::Result<TxType> {
    TxType::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown transaction type '{raw}'").into(),
        )
    })
}

fn tx_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    let amount: String = r.get(3)?;
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        category_id: r.get(2)?,
        amount: amount.parse::<Decimal>().unwrap_or(Decimal::ZERO),
        description: r.get(4)?,
        date: r.get(5)?,
        kind: kind_from_column(6, r.get(6)?)?,
        category: r.get(7)?,
    })
}

fn collect_transactions(mut rows: rusqlite::Rows<'_>) -> StoreResult<Vec<Transaction>> {
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(tx_from_row(r)?);
    }
    Ok(out)
}

const TX_COLUMNS: &str =
    "t.id, t.user_id, t.category_id, t.amount, t.description, t.date, t.type, c.name";

/// Sum of amounts for one transaction type in the range.
pub fn sum_amount(
    conn: &Connection,
    user_id: i64,
    kind: TxType,
    range: DateRange,
) -> StoreResult<Decimal> {
    let mut stmt = conn.prepare(
        "SELECT amount FROM transactions
         WHERE user_id=?1 AND type=?2 AND date BETWEEN ?3 AND ?4",
    )?;
    let rows = stmt.query_map(
        params![user_id, kind.as_str(), range.start, range.end],
        |r| r.get::<_, Option<String>>(0),
    )?;
    let mut total = Decimal::ZERO;
    for raw in rows {
        total += summable(raw?);
    }
    Ok(total)
}

/// Per-category totals for one transaction type, positive totals only,
/// largest first (name breaks ties). Categories with no activity in the
/// range never appear. Global categories (no owner) are included.
pub fn group_by_category(
    conn: &Connection,
    user_id: i64,
    kind: TxType,
    range: DateRange,
) -> StoreResult<Vec<(String, Decimal, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT c.name, t.amount FROM transactions t
         JOIN categories c ON t.category_id = c.id
         WHERE t.user_id=?1 AND t.type=?2 AND t.date BETWEEN ?3 AND ?4
           AND c.type=?2 AND (c.user_id=?1 OR c.user_id IS NULL)",
    )?;
    let rows = stmt.query_map(
        params![user_id, kind.as_str(), range.start, range.end],
        |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, Option<String>>(1)?,
            ))
        },
    )?;
    let mut agg: HashMap<String, (Decimal, i64)> = HashMap::new();
    for row in rows {
        let (name, raw) = row?;
        let entry = agg.entry(name).or_insert((Decimal::ZERO, 0));
        entry.0 += summable(raw);
        entry.1 += 1;
    }
    let mut out: Vec<(String, Decimal, i64)> = agg
        .into_iter()
        .filter(|(_, (amount, _))| *amount > Decimal::ZERO)
        .map(|(name, (amount, count))| (name, amount, count))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    Ok(out)
}

/// Transactions in range with the category name joined in, newest first
/// (date, then id, both descending).
pub fn list_transactions(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
    limit: Option<usize>,
) -> StoreResult<Vec<Transaction>> {
    let mut sql = format!(
        "SELECT {TX_COLUMNS} FROM transactions t
         LEFT JOIN categories c ON t.category_id = c.id
         WHERE t.user_id=?1 AND t.date BETWEEN ?2 AND ?3
         ORDER BY t.date DESC, t.id DESC"
    );
    if limit.is_some() {
        sql.push_str(" LIMIT ?4");
    }
    let mut stmt = conn.prepare(&sql)?;
    let rows = if let Some(n) = limit {
        stmt.query(params![user_id, range.start, range.end, n as i64])?
    } else {
        stmt.query(params![user_id, range.start, range.end])?
    };
    collect_transactions(rows)
}

/// Every transaction of the user, oldest first, for full exports.
pub fn all_transactions(conn: &Connection, user_id: i64) -> StoreResult<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TX_COLUMNS} FROM transactions t
         LEFT JOIN categories c ON t.category_id = c.id
         WHERE t.user_id=?1
         ORDER BY t.date, t.id"
    ))?;
    let rows = stmt.query(params![user_id])?;
    collect_transactions(rows)
}

/// Latest transactions regardless of date, for the dashboard.
pub fn recent_transactions(
    conn: &Connection,
    user_id: i64,
    limit: usize,
) -> StoreResult<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TX_COLUMNS} FROM transactions t
         LEFT JOIN categories c ON t.category_id = c.id
         WHERE t.user_id=?1
         ORDER BY t.date DESC, t.id DESC LIMIT ?2"
    ))?;
    let rows = stmt.query(params![user_id, limit as i64])?;
    collect_transactions(rows)
}

/// (income count, expense count) in the range.
pub fn count_by_type(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> StoreResult<(i64, i64)> {
    let counts = conn.query_row(
        "SELECT COUNT(CASE WHEN type='INCOME' THEN 1 END),
                COUNT(CASE WHEN type='EXPENSE' THEN 1 END)
         FROM transactions WHERE user_id=?1 AND date BETWEEN ?2 AND ?3",
        params![user_id, range.start, range.end],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(counts)
}

/// Number of distinct days with at least one transaction.
pub fn count_distinct_dates(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> StoreResult<i64> {
    let n = conn.query_row(
        "SELECT COUNT(DISTINCT date) FROM transactions
         WHERE user_id=?1 AND date BETWEEN ?2 AND ?3",
        params![user_id, range.start, range.end],
        |r| r.get(0),
    )?;
    Ok(n)
}

/// Earliest and latest transaction dates in the range, if any.
pub fn date_bounds(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> StoreResult<Option<(NaiveDate, NaiveDate)>> {
    let bounds: (Option<NaiveDate>, Option<NaiveDate>) = conn.query_row(
        "SELECT MIN(date), MAX(date) FROM transactions
         WHERE user_id=?1 AND date BETWEEN ?2 AND ?3",
        params![user_id, range.start, range.end],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(match bounds {
        (Some(first), Some(last)) => Some((first, last)),
        _ => None,
    })
}

/// Date of the single largest transaction of the given type; ties on the
/// amount go to the lowest id.
pub fn extreme_date(
    conn: &Connection,
    user_id: i64,
    kind: TxType,
    range: DateRange,
) -> StoreResult<Option<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT id, amount, date FROM transactions
         WHERE user_id=?1 AND type=?2 AND date BETWEEN ?3 AND ?4",
    )?;
    let rows = stmt.query_map(
        params![user_id, kind.as_str(), range.start, range.end],
        |r| {
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, Option<String>>(1)?,
                r.get::<_, NaiveDate>(2)?,
            ))
        },
    )?;
    let mut best: Option<(Decimal, i64, NaiveDate)> = None;
    for row in rows {
        let (id, raw, date) = row?;
        let amount = summable(raw);
        let better = match &best {
            None => true,
            Some((a, i, _)) => amount > *a || (amount == *a && id < *i),
        };
        if better {
            best = Some((amount, id, date));
        }
    }
    Ok(best.map(|(_, _, date)| date))
}

/// (hour-of-day, amount) pairs for every expense in range; the hour comes
/// from the row's creation timestamp.
pub fn list_expense_hours(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> StoreResult<Vec<(u32, Decimal)>> {
    let mut stmt = conn.prepare(
        "SELECT CAST(strftime('%H', created_at) AS INTEGER), amount
         FROM transactions
         WHERE user_id=?1 AND type='EXPENSE' AND date BETWEEN ?2 AND ?3",
    )?;
    let rows = stmt.query_map(params![user_id, range.start, range.end], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, Option<String>>(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (hour, raw) = row?;
        out.push((hour.rem_euclid(24) as u32, summable(raw)));
    }
    Ok(out)
}

/// Distinct `YYYY-MM` tokens with at least one transaction, newest first.
pub fn months_with_data(conn: &Connection, user_id: i64) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT substr(date,1,7) AS month FROM transactions
         WHERE user_id=?1 ORDER BY month DESC",
    )?;
    let rows = stmt.query_map(params![user_id], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn insert_transaction(conn: &Connection, tx: &NewTransaction) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO transactions(user_id, category_id, amount, description, date, type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            tx.user_id,
            tx.category_id,
            tx.amount.to_string(),
            tx.description,
            tx.date,
            tx.kind.as_str()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Owner-scoped update; returns false when no matching row exists.
pub fn update_transaction(conn: &Connection, tx: &Transaction) -> StoreResult<bool> {
    let n = conn.execute(
        "UPDATE transactions SET category_id=?1, amount=?2, description=?3, date=?4, type=?5
         WHERE id=?6 AND user_id=?7",
        params![
            tx.category_id,
            tx.amount.to_string(),
            tx.description,
            tx.date,
            tx.kind.as_str(),
            tx.id,
            tx.user_id
        ],
    )?;
    Ok(n > 0)
}

/// Owner-scoped delete; returns false when no matching row exists.
pub fn delete_transaction(conn: &Connection, user_id: i64, id: i64) -> StoreResult<bool> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    Ok(n > 0)
}

pub fn get_transaction(
    conn: &Connection,
    user_id: i64,
    id: i64,
) -> StoreResult<Option<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TX_COLUMNS} FROM transactions t
         LEFT JOIN categories c ON t.category_id = c.id
         WHERE t.id=?1 AND t.user_id=?2"
    ))?;
    let rows = stmt.query(params![id, user_id])?;
    Ok(collect_transactions(rows)?.into_iter().next())
}

fn category_from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    let budget: Option<String> = r.get(4)?;
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        kind: kind_from_column(2, r.get(2)?)?,
        user_id: r.get(3)?,
        budget_limit: budget
            .and_then(|s| s.parse::<Decimal>().ok())
            .unwrap_or(Decimal::ZERO),
    })
}

pub fn get_category(conn: &Connection, id: i64) -> StoreResult<Option<Category>> {
    let row = conn
        .query_row(
            "SELECT id, name, type, user_id, budget_limit FROM categories WHERE id=?1",
            params![id],
            category_from_row,
        )
        .optional()?;
    Ok(row)
}

/// A user's own category wins over a global one with the same name.
pub fn find_category(conn: &Connection, user_id: i64, name: &str) -> StoreResult<Option<Category>> {
    let row = conn
        .query_row(
            "SELECT id, name, type, user_id, budget_limit FROM categories
             WHERE name=?1 AND (user_id=?2 OR user_id IS NULL)
             ORDER BY user_id IS NULL LIMIT 1",
            params![name, user_id],
            category_from_row,
        )
        .optional()?;
    Ok(row)
}

/// Own plus global categories, by name.
pub fn list_categories(conn: &Connection, user_id: i64) -> StoreResult<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, user_id, budget_limit FROM categories
         WHERE user_id=?1 OR user_id IS NULL ORDER BY name",
    )?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(category_from_row(r)?);
    }
    Ok(out)
}

pub fn insert_category(
    conn: &Connection,
    name: &str,
    kind: TxType,
    user_id: Option<i64>,
) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO categories(name, type, user_id) VALUES (?1, ?2, ?3)",
        params![name, kind.as_str(), user_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_recurring_rules(conn: &Connection, user_id: i64) -> StoreResult<Vec<RecurringRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, category_id, amount, description, day_of_month, last_executed_month
         FROM recurring_rules WHERE user_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, i64>(1)?,
            r.get::<_, i64>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, i64>(5)?,
            r.get::<_, Option<String>>(6)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, user_id, category_id, amount, description, day, token) = row?;
        out.push(RecurringRule {
            id,
            user_id,
            category_id,
            amount: amount
                .and_then(|s| s.parse::<Decimal>().ok())
                .unwrap_or(Decimal::ZERO),
            description,
            day_of_month: day.clamp(1, 31) as u32,
            last_executed: token.as_deref().and_then(MonthToken::parse),
        });
    }
    Ok(out)
}

pub fn insert_recurring_rule(
    conn: &Connection,
    user_id: i64,
    category_id: i64,
    amount: Decimal,
    description: Option<&str>,
    day_of_month: u32,
) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO recurring_rules(user_id, category_id, amount, description, day_of_month)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            category_id,
            amount.to_string(),
            description,
            day_of_month as i64
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_rule_last_executed(
    conn: &Connection,
    rule_id: i64,
    month: &MonthToken,
) -> StoreResult<()> {
    conn.execute(
        "UPDATE recurring_rules SET last_executed_month=?1 WHERE id=?2",
        params![month.to_string(), rule_id],
    )?;
    Ok(())
}

pub fn insert_user(conn: &Connection, username: &str) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO users(username) VALUES (?1)",
        params![username],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_users(conn: &Connection) -> StoreResult<Vec<(i64, String)>> {
    let mut stmt = conn.prepare("SELECT id, username FROM users ORDER BY id")?;
    let rows = stmt.query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
