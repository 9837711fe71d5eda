// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Daily streak tracking over an ordered history of performance records.

use crate::error::{ClipError, ClipResult};
use crate::models::PerformanceRecord;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Most recent day that kept the streak alive.
    pub last_active_date: Option<NaiveDate>,
    /// Most recent day applied, qualifying or not.
    pub last_record_date: Option<NaiveDate>,
    pub streak_start_date: Option<NaiveDate>,
    pub total_days: u32,
}

impl StreakState {
    pub fn is_active(&self) -> bool {
        self.current_streak > 0
    }
}

/// Apply one day's record. Records must arrive in strictly increasing date
/// order; a skipped day breaks the streak just like a poor day.
pub fn update_streak(state: &StreakState, record: &PerformanceRecord) -> ClipResult<StreakState> {
    if let Some(last) = state.last_record_date {
        if record.date <= last {
            return Err(ClipError::OutOfOrderRecord {
                date: record.date,
                last,
            });
        }
    }

    let mut next = *state;
    next.last_record_date = Some(record.date);
    next.total_days = state.total_days.saturating_add(1);

    if record.category.qualifies_for_streak() {
        let continues = state.is_active()
            && state
                .last_active_date
                .is_some_and(|d| d + Duration::days(1) == record.date);
        if continues {
            next.current_streak = state.current_streak.saturating_add(1);
        } else {
            next.current_streak = 1;
            next.streak_start_date = Some(record.date);
        }
        next.last_active_date = Some(record.date);
        next.longest_streak = next.longest_streak.max(next.current_streak);
    } else {
        next.current_streak = 0;
        next.streak_start_date = None;
    }
    Ok(next)
}

/// Fold a full history from the initial broken state.
pub fn replay_streak<'a, I>(records: I) -> ClipResult<StreakState>
where
    I: IntoIterator<Item = &'a PerformanceRecord>,
{
    records
        .into_iter()
        .try_fold(StreakState::default(), |state, rec| update_streak(&state, rec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring::build_record;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, n).unwrap()
    }

    fn rec(n: u32, spend: Decimal) -> PerformanceRecord {
        build_record(day(n), dec!(100), spend).unwrap()
    }

    #[test]
    fn good_good_poor_good() {
        let records = [rec(1, dec!(80)), rec(2, dec!(85)), rec(3, dec!(120)), rec(4, dec!(60))];
        let mut state = StreakState::default();
        let mut seen = Vec::new();
        for r in &records {
            state = update_streak(&state, r).unwrap();
            seen.push(state.current_streak);
            assert!(state.current_streak <= state.longest_streak);
        }
        assert_eq!(seen, vec![1, 2, 0, 1]);
        assert_eq!(state.longest_streak, 2);
        assert_eq!(state.total_days, 4);
        assert_eq!(state.streak_start_date, Some(day(4)));
        assert_eq!(replay_streak(&records).unwrap(), state);
    }

    #[test]
    fn missing_day_breaks_streak() {
        let records = [rec(1, dec!(10)), rec(2, dec!(10)), rec(5, dec!(10))];
        let state = replay_streak(&records).unwrap();
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 2);
        assert_eq!(state.last_active_date, Some(day(5)));
    }

    #[test]
    fn neutral_day_resets() {
        let state = replay_streak(&[rec(1, dec!(10)), rec(2, dec!(100))]).unwrap();
        assert_eq!(state.current_streak, 0);
        assert!(!state.is_active());
        assert_eq!(state.longest_streak, 1);
    }

    #[test]
    fn out_of_order_records_are_rejected() {
        let state = replay_streak(&[rec(3, dec!(10))]).unwrap();
        let err = update_streak(&state, &rec(3, dec!(10))).unwrap_err();
        assert_eq!(
            err,
            ClipError::OutOfOrderRecord {
                date: day(3),
                last: day(3)
            }
        );
        assert!(update_streak(&state, &rec(2, dec!(10))).is_err());
    }

    #[test]
    fn initial_state_is_broken() {
        let state = StreakState::default();
        assert_eq!(state.current_streak, 0);
        assert_eq!(state.longest_streak, 0);
        assert_eq!(state.last_active_date, None);
    }
}
