// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::recurrence::RecurrenceRule;
use crate::error::ClipError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub current_balance: Decimal,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(ClipError::unknown("ledger direction", other, "income, expense")),
        }
    }
}

/// A planned income or expense. `amount` is always positive; the sign
/// lives in `direction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerItem {
    pub id: i64,
    pub name: String,
    pub amount: Decimal,
    pub occurs_on: NaiveDate,
    pub direction: Direction,
    pub recurrence: Option<RecurrenceRule>,
    pub category: String,
    pub settled: bool,
}

impl LedgerItem {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn validate_amount(amount: Decimal) -> Result<Decimal, ClipError> {
        if amount <= Decimal::ZERO {
            return Err(ClipError::InvalidAmount(format!(
                "ledger amount must be greater than zero (got {})",
                amount
            )));
        }
        Ok(amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceCategory {
    Excellent,
    Good,
    Neutral,
    Poor,
    Critical,
}

impl PerformanceCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Neutral => "neutral",
            Self::Poor => "poor",
            Self::Critical => "critical",
        }
    }

    /// Good or better keeps a streak alive.
    pub const fn qualifies_for_streak(self) -> bool {
        matches!(self, Self::Excellent | Self::Good)
    }
}

impl fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceCategory {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excellent" => Ok(Self::Excellent),
            "good" => Ok(Self::Good),
            "neutral" => Ok(Self::Neutral),
            "poor" => Ok(Self::Poor),
            "critical" => Ok(Self::Critical),
            other => Err(ClipError::unknown(
                "performance category",
                other,
                "excellent, good, neutral, poor, critical",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub date: NaiveDate,
    pub target_allowance: Decimal,
    pub actual_spend: Decimal,
    pub saved_amount: Decimal,
    pub score: u8,
    pub category: PerformanceCategory,
}
