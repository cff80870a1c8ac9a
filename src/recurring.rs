// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly recurring postings. A rule fires at most once per calendar month,
//! once today has reached its configured day-of-month; the posting and the
//! month marker update commit together.

use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

use crate::models::{MonthToken, NewTransaction, RecurringRule, TxType};
use crate::store::{self, StoreResult};

/// Marks automatic postings in the ledger.
pub const AUTO_PREFIX: &str = "[Auto] ";

/// Evaluates every rule of the user against `today` and posts the due ones.
/// Returns the number of postings made. A failing rule is logged and skipped;
/// the scan always finishes.
pub fn run_due_rules(conn: &mut Connection, user_id: i64, today: NaiveDate) -> usize {
    let rules = match store::list_recurring_rules(conn, user_id) {
        Ok(rules) => rules,
        Err(err) => {
            tracing::error!(error = %err, "could not load recurring rules");
            return 0;
        }
    };
    let current = MonthToken::from_date(today);
    let mut posted = 0;
    for rule in rules {
        if !is_due(&rule, today) {
            continue;
        }
        match post_rule(conn, &rule, today, current) {
            Ok(()) => {
                posted += 1;
                tracing::info!(rule = rule.id, "posted recurring transaction");
            }
            Err(err) => {
                tracing::warn!(rule = rule.id, error = %err, "recurring posting failed, skipping rule");
            }
        }
    }
    posted
}

/// Due iff the rule has not fired in `today`'s month and today has reached
/// the configured day. The month guard compares (year, month) values, not
/// the stored token text.
fn is_due(rule: &RecurringRule, today: NaiveDate) -> bool {
    if rule.last_executed == Some(MonthToken::from_date(today)) {
        return false;
    }
    today.day() >= rule.day_of_month
}

fn post_rule(
    conn: &mut Connection,
    rule: &RecurringRule,
    today: NaiveDate,
    current: MonthToken,
) -> StoreResult<()> {
    let tx = conn.transaction()?;
    let description = format!("{}{}", AUTO_PREFIX, rule.description.as_deref().unwrap_or(""));
    store::insert_transaction(
        &tx,
        &NewTransaction {
            user_id: rule.user_id,
            category_id: rule.category_id,
            amount: rule.amount,
            description: Some(description),
            date: today,
            kind: TxType::Expense,
        },
    )?;
    store::update_rule_last_executed(&tx, rule.id, &current)?;
    tx.commit()?;
    Ok(())
}
