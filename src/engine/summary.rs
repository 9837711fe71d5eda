// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::PerformanceRecord;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

const WEEK: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub days_tracked: usize,
    pub total_saved: Decimal,
    pub average_score: Decimal,
    pub week_average: Decimal,
    pub personal_best: u8,
    pub trend: Trend,
    pub latest: Option<PerformanceRecord>,
}

fn mean(scores: &[u8]) -> Decimal {
    if scores.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = scores.iter().map(|s| Decimal::from(*s)).sum();
    (total / Decimal::from(scores.len())).round_dp(1)
}

/// Summarize the records dated within the last `days` days up to `today`.
/// `records` may be in any order.
pub fn summarize(records: &[PerformanceRecord], today: NaiveDate, days: i64) -> Summary {
    let cutoff = Duration::try_days(days)
        .and_then(|span| today.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN);
    let mut recent: Vec<&PerformanceRecord> = records
        .iter()
        .filter(|r| r.date >= cutoff && r.date <= today)
        .collect();
    // newest first
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    let scores: Vec<u8> = recent.iter().map(|r| r.score).collect();
    let week_len = scores.len().min(WEEK);

    let trend = if scores.len() < WEEK {
        Trend::InsufficientData
    } else {
        let latest = mean(&scores[..WEEK]);
        let previous_slice = &scores[WEEK..scores.len().min(2 * WEEK)];
        let previous = if previous_slice.is_empty() {
            latest
        } else {
            mean(previous_slice)
        };
        if latest > previous {
            Trend::Improving
        } else if latest < previous {
            Trend::Declining
        } else {
            Trend::Stable
        }
    };

    Summary {
        days_tracked: recent.len(),
        total_saved: recent
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.saved_amount)),
        average_score: mean(&scores),
        week_average: mean(&scores[..week_len]),
        personal_best: scores.iter().copied().max().unwrap_or(0),
        trend,
        latest: recent.first().map(|r| (*r).clone()),
    }
}
