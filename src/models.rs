// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxType {
    Income,
    Expense,
}

impl TxType {
    /// Storage representation, shared with the original database layout.
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Income => "INCOME",
            TxType::Expense => "EXPENSE",
        }
    }

    /// Human-facing label used in CSV exports and tables.
    pub fn label(&self) -> &'static str {
        match self {
            TxType::Income => "Income",
            TxType::Expense => "Expense",
        }
    }

    pub fn parse(s: &str) -> Option<TxType> {
        match s {
            "INCOME" => Some(TxType::Income),
            "EXPENSE" => Some(TxType::Expense),
            _ => None,
        }
    }
}

/// Inclusive calendar-date interval used by every report query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Number of days covered, both endpoints included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Calendar month marker for recurring postings, persisted as the legacy
/// `MM/yyyy` token. Comparison is structural, never on the raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthToken {
    pub year: i32,
    pub month: u32,
}

impl MonthToken {
    pub fn from_date(date: NaiveDate) -> Self {
        MonthToken {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let (m, y) = s.split_once('/')?;
        let month: u32 = m.parse().ok()?;
        let year: i32 = y.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(MonthToken { year, month })
    }
}

impl fmt::Display for MonthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub kind: TxType,
    /// Category name joined in by the store; `None` if the category is gone.
    pub category: Option<String>,
}

/// Insert payload; id and created_at are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub kind: TxType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: TxType,
    /// `None` marks a global category visible to every user.
    pub user_id: Option<i64>,
    pub budget_limit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub description: Option<String>,
    pub day_of_month: u32,
    pub last_executed: Option<MonthToken>,
}
