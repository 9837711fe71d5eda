// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Projection of recurring ledger items onto concrete calendar dates.

use crate::error::{ClipError, ClipResult};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Days between semimonthly occurrences; the rule interval does not apply.
const SEMIMONTHLY_DAYS: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 7] = [
        Self::Daily,
        Self::Weekly,
        Self::Biweekly,
        Self::Semimonthly,
        Self::Monthly,
        Self::Quarterly,
        Self::Yearly,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Semimonthly => "semimonthly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "biweekly" | "bi-weekly" => Ok(Self::Biweekly),
            "semimonthly" | "semi-monthly" => Ok(Self::Semimonthly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" | "annually" => Ok(Self::Yearly),
            other => Err(ClipError::InvalidRecurrenceRule(format!(
                "unknown frequency '{}'",
                other
            ))),
        }
    }
}

/// A validated recurrence: `interval` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval: u32,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, interval: u32) -> ClipResult<Self> {
        if interval == 0 {
            return Err(ClipError::InvalidRecurrenceRule(
                "interval must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            frequency,
            interval,
        })
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Parse a frequency name plus interval. `"none"` (or an empty name)
    /// yields `Ok(None)`, meaning the item does not repeat.
    pub fn parse(frequency: &str, interval: u32) -> ClipResult<Option<Self>> {
        let f = frequency.trim();
        if f.is_empty() || f.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        let freq = f.parse::<Frequency>()?;
        Self::new(freq, interval).map(Some)
    }

    /// The `k`-th occurrence counted from `anchor` (k = 0 is the anchor).
    ///
    /// Computing from the anchor rather than from the previous occurrence
    /// keeps a clamped month end from dragging later occurrences earlier.
    pub fn nth_after(&self, anchor: NaiveDate, k: u32) -> Option<NaiveDate> {
        let n = i64::from(self.interval) * i64::from(k);
        match self.frequency {
            Frequency::Daily => anchor.checked_add_signed(Duration::days(n)),
            Frequency::Weekly => anchor.checked_add_signed(Duration::days(7 * n)),
            Frequency::Biweekly => anchor.checked_add_signed(Duration::days(14 * n)),
            Frequency::Semimonthly => {
                anchor.checked_add_signed(Duration::days(SEMIMONTHLY_DAYS * i64::from(k)))
            }
            Frequency::Monthly => add_months_clamped(anchor, n),
            Frequency::Quarterly => add_months_clamped(anchor, 3 * n),
            Frequency::Yearly => add_months_clamped(anchor, 12 * n),
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.interval == 1 || self.frequency == Frequency::Semimonthly {
            write!(f, "{}", self.frequency)
        } else {
            write!(f, "{} x{}", self.frequency, self.interval)
        }
    }
}

/// Add calendar months, clamping the day to the end of the target month
/// (Jan 31 + 1 month = Feb 28 or 29).
pub fn add_months_clamped(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

/// Lazily walks the occurrences of a rule starting at its anchor date.
#[derive(Debug, Clone)]
pub struct Occurrences {
    anchor: NaiveDate,
    rule: Option<RecurrenceRule>,
    k: u32,
    done: bool,
}

impl Occurrences {
    pub fn new(anchor: NaiveDate, rule: Option<RecurrenceRule>) -> Self {
        Self {
            anchor,
            rule,
            k: 0,
            done: false,
        }
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.done {
            return None;
        }
        let next = match self.rule {
            Some(rule) => rule.nth_after(self.anchor, self.k),
            None => {
                self.done = true;
                Some(self.anchor)
            }
        };
        match next {
            Some(d) => {
                match self.k.checked_add(1) {
                    Some(k) => self.k = k,
                    None => self.done = true,
                }
                Some(d)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// The first `count` occurrences of `rule` starting at `start`.
///
/// A non-recurring item (`rule == None`) always yields just `[start]`.
pub fn project_occurrences(
    start: NaiveDate,
    rule: Option<&RecurrenceRule>,
    count: usize,
) -> ClipResult<Vec<NaiveDate>> {
    if count == 0 {
        return Err(ClipError::InvalidRecurrenceRule(
            "occurrence count must be at least 1".to_string(),
        ));
    }
    let dates: Vec<NaiveDate> = Occurrences::new(start, rule.copied()).take(count).collect();
    if rule.is_some() && dates.len() < count {
        return Err(ClipError::InvalidRecurrenceRule(format!(
            "cannot project {} occurrences from {}: calendar range exceeded",
            count, start
        )));
    }
    Ok(dates)
}

/// Every occurrence falling inside the inclusive window `[from, to]`.
pub fn occurrences_between(
    start: NaiveDate,
    rule: Option<&RecurrenceRule>,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<NaiveDate> {
    if to < from {
        return Vec::new();
    }
    Occurrences::new(start, rule.copied())
        .take_while(|d| *d <= to)
        .filter(|d| *d >= from)
        .collect()
}
