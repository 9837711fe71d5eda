// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Input validation failures raised by the allowance and scoring engine.
///
/// None of these are transient: the caller passed a value the engine
/// cannot work with and must report it upward.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipError {
    #[error("invalid recurrence rule: {0}")]
    InvalidRecurrenceRule(String),

    #[error("invalid period: {0} days remaining, need at least 1")]
    InvalidPeriod(i64),

    #[error("invalid target allowance {0}: must be greater than zero")]
    InvalidTarget(Decimal),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("performance record for {date} arrives after {last}; records must be applied in date order")]
    OutOfOrderRecord { date: NaiveDate, last: NaiveDate },
}

pub type ClipResult<T> = Result<T, ClipError>;

impl ClipError {
    pub fn negative(field: &str, value: Decimal) -> Self {
        Self::InvalidAmount(format!("{} must not be negative (got {})", field, value))
    }

    /// A sum or ratio left the range a `Decimal` can represent.
    pub fn overflow(field: &str) -> Self {
        Self::InvalidAmount(format!("{} is out of range", field))
    }

    pub fn unknown(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self::UnknownValue {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}
