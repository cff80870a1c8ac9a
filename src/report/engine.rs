// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only aggregation over the ledger. Every operation here degrades to a
//! zero/empty result when the store fails — a broken report section is logged,
//! never surfaced as an error to the caller.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{DateRange, Transaction, TxType};
use crate::report::assembler;
use crate::store::{self, StoreResult};
use crate::utils::{month_end, month_key, month_start, months_back, round2};

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Time-of-day bands by bucket index (hour / 6).
pub const TIME_PERIODS: [&str; 4] = [
    "Night (00-06)",
    "Morning (06-12)",
    "Afternoon (12-18)",
    "Evening (18-24)",
];

// Fixed display order: morning, afternoon, evening, night.
const TIME_DISPLAY_ORDER: [usize; 4] = [1, 2, 3, 0];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub income_count: i64,
    pub expense_count: i64,
    pub savings_rate: Decimal,
}

impl TrendPoint {
    pub fn empty(month: String) -> Self {
        TrendPoint {
            month,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            balance: Decimal::ZERO,
            income_count: 0,
            expense_count: 0,
            savings_rate: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayOfWeekStat {
    pub day: String,
    pub amount: Decimal,
    pub count: i64,
    pub avg_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOfDayStat {
    pub period: String,
    pub amount: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopTransaction {
    pub id: i64,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdvancedStatistics {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub income_count: i64,
    pub expense_count: i64,
    pub total_count: i64,
    pub avg_income_per_transaction: Decimal,
    pub avg_expense_per_transaction: Decimal,
    pub savings_rate: Decimal,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub highest_expense_date: Option<NaiveDate>,
    pub highest_income_date: Option<NaiveDate>,
    pub active_days: i64,
    pub activity_rate: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickOverview {
    pub current_month: MonthlySummary,
    pub last_month: MonthlySummary,
    pub income_change: Decimal,
    pub expense_change: Decimal,
    pub top_expenses: Vec<TopTransaction>,
    pub top_incomes: Vec<TopTransaction>,
    pub recent_transactions: Vec<Transaction>,
}

/// The never-crash boundary: log the failure and hand back the zero value.
fn or_default<T: Default>(op: &'static str, res: StoreResult<T>) -> T {
    match res {
        Ok(v) => v,
        Err(err) => {
            tracing::error!(op, error = %err, "report query failed, degrading to empty result");
            T::default()
        }
    }
}

/// `(income - expense) / income * 100`, 0 when there is no income.
pub fn savings_rate(income: Decimal, expense: Decimal) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round2((income - expense) * Decimal::ONE_HUNDRED / income)
}

/// Month-over-month change in percent. A zero baseline maps to 100 when the
/// current value is positive and 0 otherwise.
pub fn percentage_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }
    round2((current - previous) * Decimal::ONE_HUNDRED / previous)
}

pub fn monthly_summary(conn: &Connection, user_id: i64, range: DateRange) -> MonthlySummary {
    or_default("monthly_summary", try_monthly_summary(conn, user_id, range))
}

fn try_monthly_summary(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> StoreResult<MonthlySummary> {
    let income = store::sum_amount(conn, user_id, TxType::Income, range)?;
    let expense = store::sum_amount(conn, user_id, TxType::Expense, range)?;
    Ok(MonthlySummary {
        income,
        expense,
        balance: income - expense,
    })
}

pub fn expense_by_category(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> Vec<CategoryTotal> {
    by_category(conn, user_id, TxType::Expense, range)
}

pub fn income_by_category(conn: &Connection, user_id: i64, range: DateRange) -> Vec<CategoryTotal> {
    by_category(conn, user_id, TxType::Income, range)
}

fn by_category(
    conn: &Connection,
    user_id: i64,
    kind: TxType,
    range: DateRange,
) -> Vec<CategoryTotal> {
    or_default(
        "group_by_category",
        store::group_by_category(conn, user_id, kind, range),
    )
    .into_iter()
    .map(|(category, amount, count)| CategoryTotal {
        category,
        amount,
        count,
    })
    .collect()
}

/// Income/expense per month for the `months` calendar months ending at
/// `today`'s month, oldest first. Months without transactions are present
/// with zero values, so the result always has exactly `months` entries.
pub fn monthly_trend(
    conn: &Connection,
    user_id: i64,
    months: u32,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    let months = months.max(1);
    let start = months_back(today, months - 1);
    let range = DateRange::new(start, month_end(today));
    let raw = or_default("monthly_trend", try_monthly_trend(conn, user_id, range));
    assembler::fill_missing_months(raw, start, months)
}

fn try_monthly_trend(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> StoreResult<Vec<TrendPoint>> {
    #[derive(Default)]
    struct Bucket {
        income: Decimal,
        expense: Decimal,
        income_count: i64,
        expense_count: i64,
    }

    let txs = store::list_transactions(conn, user_id, range, None)?;
    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();
    for tx in txs {
        let amount = tx.amount.max(Decimal::ZERO);
        let bucket = buckets.entry(month_key(tx.date)).or_default();
        match tx.kind {
            TxType::Income => {
                bucket.income += amount;
                bucket.income_count += 1;
            }
            TxType::Expense => {
                bucket.expense += amount;
                bucket.expense_count += 1;
            }
        }
    }
    Ok(buckets
        .into_iter()
        .map(|(month, b)| TrendPoint {
            month,
            income: b.income,
            expense: b.expense,
            balance: b.income - b.expense,
            income_count: b.income_count,
            expense_count: b.expense_count,
            savings_rate: savings_rate(b.income, b.expense),
        })
        .collect())
}

/// Expense totals bucketed by weekday of the transaction date
/// (0=Sunday..6=Saturday). Only weekdays with activity are emitted, in
/// index order.
pub fn expense_by_day_of_week(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> Vec<DayOfWeekStat> {
    let txs = or_default(
        "expense_by_day_of_week",
        store::list_transactions(conn, user_id, range, None),
    );
    let mut buckets: [(Decimal, i64); 7] = Default::default();
    for tx in txs {
        if tx.kind != TxType::Expense {
            continue;
        }
        let idx = tx.date.weekday().num_days_from_sunday() as usize;
        buckets[idx].0 += tx.amount.max(Decimal::ZERO);
        buckets[idx].1 += 1;
    }
    buckets
        .iter()
        .enumerate()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(idx, (amount, count))| DayOfWeekStat {
            day: DAY_NAMES[idx].to_string(),
            amount: *amount,
            count: *count,
            avg_amount: round2(*amount / Decimal::from(*count)),
        })
        .collect()
}

/// Expense totals bucketed by the hour the row was recorded, in the fixed
/// display order morning, afternoon, evening, night. Only populated bands
/// are emitted.
pub fn expense_by_time_of_day(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> Vec<TimeOfDayStat> {
    let rows = or_default(
        "expense_by_time_of_day",
        store::list_expense_hours(conn, user_id, range),
    );
    let mut buckets: [(Decimal, i64); 4] = Default::default();
    for (hour, amount) in rows {
        let idx = (hour as usize / 6).min(3);
        buckets[idx].0 += amount;
        buckets[idx].1 += 1;
    }
    TIME_DISPLAY_ORDER
        .iter()
        .filter(|&&idx| buckets[idx].1 > 0)
        .map(|&idx| TimeOfDayStat {
            period: TIME_PERIODS[idx].to_string(),
            amount: buckets[idx].0,
            count: buckets[idx].1,
        })
        .collect()
}

/// The `limit` largest transactions of one type, descending by amount; equal
/// amounts are ordered by ascending id so the result is stable.
pub fn top_transactions(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
    kind: TxType,
    limit: usize,
) -> Vec<TopTransaction> {
    let mut txs = or_default(
        "top_transactions",
        store::list_transactions(conn, user_id, range, None),
    );
    txs.retain(|t| t.kind == kind);
    txs.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.id.cmp(&b.id)));
    txs.truncate(limit);
    txs.into_iter()
        .map(|t| TopTransaction {
            id: t.id,
            amount: t.amount,
            description: t.description,
            date: t.date,
            category: t.category,
        })
        .collect()
}

pub fn advanced_statistics(
    conn: &Connection,
    user_id: i64,
    range: DateRange,
) -> AdvancedStatistics {
    let summary = monthly_summary(conn, user_id, range);
    let (income_count, expense_count) =
        or_default("count_by_type", store::count_by_type(conn, user_id, range));

    let avg_income_per_transaction = if income_count > 0 {
        round2(summary.income / Decimal::from(income_count))
    } else {
        Decimal::ZERO
    };
    let avg_expense_per_transaction = if expense_count > 0 {
        round2(summary.expense / Decimal::from(expense_count))
    } else {
        Decimal::ZERO
    };

    let bounds = or_default("date_bounds", store::date_bounds(conn, user_id, range));
    let highest_expense_date = or_default(
        "highest_expense_date",
        store::extreme_date(conn, user_id, TxType::Expense, range),
    );
    let highest_income_date = or_default(
        "highest_income_date",
        store::extreme_date(conn, user_id, TxType::Income, range),
    );

    let active_days = or_default(
        "count_distinct_dates",
        store::count_distinct_dates(conn, user_id, range),
    );
    let total_days = range.days();
    let activity_rate = if total_days > 0 && active_days > 0 {
        round2(Decimal::from(active_days) * Decimal::ONE_HUNDRED / Decimal::from(total_days))
    } else {
        Decimal::ZERO
    };

    AdvancedStatistics {
        income: summary.income,
        expense: summary.expense,
        balance: summary.balance,
        income_count,
        expense_count,
        total_count: income_count + expense_count,
        avg_income_per_transaction,
        avg_expense_per_transaction,
        savings_rate: savings_rate(summary.income, summary.expense),
        first_date: bounds.map(|(first, _)| first),
        last_date: bounds.map(|(_, last)| last),
        highest_expense_date,
        highest_income_date,
        active_days,
        activity_rate,
    }
}

/// Dashboard snapshot: this month against last month, the month's biggest
/// movers, and the past week of activity.
pub fn quick_overview(conn: &Connection, user_id: i64, today: NaiveDate) -> QuickOverview {
    let current = DateRange::new(month_start(today), month_end(today));
    let prev_anchor = months_back(today, 1);
    let previous = DateRange::new(prev_anchor, month_end(prev_anchor));

    let current_month = monthly_summary(conn, user_id, current);
    let last_month = monthly_summary(conn, user_id, previous);
    let income_change = percentage_change(current_month.income, last_month.income);
    let expense_change = percentage_change(current_month.expense, last_month.expense);

    let top_expenses = top_transactions(conn, user_id, current, TxType::Expense, 5);
    let top_incomes = top_transactions(conn, user_id, current, TxType::Income, 5);

    let week_start = today.checked_sub_days(Days::new(7)).unwrap_or(today);
    let recent_transactions = or_default(
        "recent_transactions",
        store::list_transactions(conn, user_id, DateRange::new(week_start, today), None),
    );

    QuickOverview {
        current_month,
        last_month,
        income_change,
        expense_change,
        top_expenses,
        top_incomes,
        recent_transactions,
    }
}
