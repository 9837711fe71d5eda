// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::recurrence::{Occurrences, occurrences_between};
use crate::error::{ClipError, ClipResult};
use crate::models::{AccountSnapshot, Direction, LedgerItem};
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fallback period length when no paycheck is scheduled.
const DEFAULT_PAYCHECK_GAP_DAYS: i64 = 7;
/// How far ahead to look for the next paycheck.
const PAYCHECK_HORIZON_DAYS: i64 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAllowanceResult {
    pub date: NaiveDate,
    pub net_available: Decimal,
    pub days_remaining: i64,
    pub daily_clip: Decimal,
}

/// `net = balance + income - expenses`, spread evenly over the remaining days.
///
/// A negative clip is a valid result and means the period is already short.
pub fn compute_daily_allowance(
    date: NaiveDate,
    current_balance: Decimal,
    expected_income: Decimal,
    upcoming_expenses: Decimal,
    days_remaining: i64,
) -> ClipResult<DailyAllowanceResult> {
    if days_remaining < 1 {
        return Err(ClipError::InvalidPeriod(days_remaining));
    }
    if expected_income < Decimal::ZERO {
        return Err(ClipError::negative("expected income", expected_income));
    }
    if upcoming_expenses < Decimal::ZERO {
        return Err(ClipError::negative("upcoming expenses", upcoming_expenses));
    }
    let net_available = current_balance
        .checked_add(expected_income)
        .and_then(|v| v.checked_sub(upcoming_expenses))
        .ok_or_else(|| ClipError::overflow("net available"))?;
    let daily_clip = net_available
        .checked_div(Decimal::from(days_remaining))
        .ok_or_else(|| ClipError::overflow("daily clip"))?;
    Ok(DailyAllowanceResult {
        date,
        net_available,
        days_remaining,
        daily_clip,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodMode {
    #[default]
    NextPaycheck,
    EndOfMonth,
}

impl PeriodMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NextPaycheck => "next-paycheck",
            Self::EndOfMonth => "end-of-month",
        }
    }
}

impl fmt::Display for PeriodMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodMode {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "next-paycheck" | "paycheck" => Ok(Self::NextPaycheck),
            "end-of-month" | "month" => Ok(Self::EndOfMonth),
            other => Err(ClipError::unknown(
                "period mode",
                other,
                "next-paycheck, end-of-month",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub mode: PeriodMode,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days_remaining: i64,
}

/// Work out the budgeting window that starts today.
///
/// Same-day periods count as one day so the clip never divides by zero.
pub fn resolve_period(mode: PeriodMode, today: NaiveDate, items: &[LedgerItem]) -> Period {
    let end = match mode {
        PeriodMode::EndOfMonth => first_of_next_month(today),
        PeriodMode::NextPaycheck => next_paycheck(today, items)
            .unwrap_or(today + Duration::days(DEFAULT_PAYCHECK_GAP_DAYS)),
    };
    Period {
        mode,
        start: today,
        end,
        days_remaining: (end - today).num_days().max(1),
    }
}

fn first_of_next_month(today: NaiveDate) -> NaiveDate {
    let (y, m) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(today)
}

fn next_paycheck(today: NaiveDate, items: &[LedgerItem]) -> Option<NaiveDate> {
    let horizon = today + Duration::days(PAYCHECK_HORIZON_DAYS);
    items
        .iter()
        .filter(|i| i.direction == Direction::Income && !i.settled)
        .filter_map(|i| {
            Occurrences::new(i.occurs_on, i.recurrence)
                .take_while(|d| *d <= horizon)
                .find(|d| *d > today)
        })
        .min()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub item_id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub direction: Direction,
    pub category: String,
    pub recurring: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowTotals {
    pub expected_income: Decimal,
    pub upcoming_expenses: Decimal,
    pub occurrences: Vec<Occurrence>,
}

/// Expand every unsettled item into its occurrences within `[from, to]`
/// and total them by direction.
pub fn aggregate_window(
    items: &[LedgerItem],
    from: NaiveDate,
    to: NaiveDate,
) -> ClipResult<WindowTotals> {
    let mut totals = WindowTotals::default();
    for item in items.iter().filter(|i| !i.settled) {
        for date in occurrences_between(item.occurs_on, item.recurrence.as_ref(), from, to) {
            let (total, field) = match item.direction {
                Direction::Income => (&mut totals.expected_income, "expected income"),
                Direction::Expense => (&mut totals.upcoming_expenses, "upcoming expenses"),
            };
            *total = total
                .checked_add(item.amount)
                .ok_or_else(|| ClipError::overflow(field))?;
            totals.occurrences.push(Occurrence {
                item_id: item.id,
                name: item.name.clone(),
                date,
                amount: item.amount,
                direction: item.direction,
                category: item.category.clone(),
                recurring: item.is_recurring(),
            });
        }
    }
    totals
        .occurrences
        .sort_by(|a, b| a.date.cmp(&b.date).then(a.item_id.cmp(&b.item_id)));
    Ok(totals)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipReport {
    pub current_balance: Decimal,
    pub period: Period,
    pub totals: WindowTotals,
    pub allowance: DailyAllowanceResult,
}

/// Today's clip from a balance snapshot and the planned ledger.
pub fn daily_clip_for(
    snapshot: &AccountSnapshot,
    items: &[LedgerItem],
    mode: PeriodMode,
    today: NaiveDate,
) -> ClipResult<ClipReport> {
    let period = resolve_period(mode, today, items);
    let totals = aggregate_window(items, period.start, period.end)?;
    let allowance = compute_daily_allowance(
        today,
        snapshot.current_balance,
        totals.expected_income,
        totals.upcoming_expenses,
        period.days_remaining,
    )?;
    Ok(ClipReport {
        current_balance: snapshot.current_balance,
        period,
        totals,
        allowance,
    })
}
