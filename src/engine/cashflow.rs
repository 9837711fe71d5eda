// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::allowance::Occurrence;
use crate::error::{ClipError, ClipResult};
use crate::models::Direction;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Comfortable,
    Tight,
    SlightlyOver,
    Significant,
}

impl Recommendation {
    fn for_clip(new_clip: Decimal) -> Self {
        if new_clip >= dec!(20) {
            Self::Comfortable
        } else if new_clip >= Decimal::ZERO {
            Self::Tight
        } else if new_clip >= dec!(-10) {
            Self::SlightlyOver
        } else {
            Self::Significant
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Comfortable => "You can comfortably afford this",
            Self::Tight => "Affordable but will tighten your budget",
            Self::SlightlyOver => "This would put you slightly over budget",
            Self::Significant => "This would significantly impact your budget",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub expense: Decimal,
    pub current_clip: Decimal,
    pub new_clip: Decimal,
    pub impact_per_day: Decimal,
    pub days_affected: i64,
    pub recommendation: Recommendation,
}

/// What a one-off expense would do to today's clip if it were spread over
/// the rest of the period.
pub fn test_scenario(current_clip: Decimal, days_remaining: i64, expense: Decimal) -> ClipResult<Scenario> {
    if days_remaining < 1 {
        return Err(ClipError::InvalidPeriod(days_remaining));
    }
    if expense < Decimal::ZERO {
        return Err(ClipError::negative("scenario expense", expense));
    }
    let impact_per_day = expense / Decimal::from(days_remaining);
    let new_clip = current_clip
        .checked_sub(impact_per_day)
        .ok_or_else(|| ClipError::overflow("scenario clip"))?;
    Ok(Scenario {
        expense,
        current_clip,
        new_clip,
        impact_per_day,
        days_affected: days_remaining,
        recommendation: Recommendation::for_clip(new_clip),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineDay {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net_change: Decimal,
    pub balance: Decimal,
}

/// Day-by-day running balance for `days` days starting at `start`.
pub fn cash_flow_timeline(
    opening_balance: Decimal,
    occurrences: &[Occurrence],
    start: NaiveDate,
    days: u32,
) -> ClipResult<Vec<TimelineDay>> {
    let mut balance = opening_balance;
    let mut timeline = Vec::new();
    for offset in 0..i64::from(days) {
        let date = start
            .checked_add_signed(Duration::days(offset))
            .ok_or_else(|| ClipError::InvalidPeriod(i64::from(days)))?;
        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        for o in occurrences.iter().filter(|o| o.date == date) {
            let (total, field) = match o.direction {
                Direction::Income => (&mut income, "timeline income"),
                Direction::Expense => (&mut expenses, "timeline expenses"),
            };
            *total = total
                .checked_add(o.amount)
                .ok_or_else(|| ClipError::overflow(field))?;
        }
        let net_change = income
            .checked_sub(expenses)
            .ok_or_else(|| ClipError::overflow("timeline net change"))?;
        balance = balance
            .checked_add(net_change)
            .ok_or_else(|| ClipError::overflow("timeline balance"))?;
        timeline.push(TimelineDay {
            date,
            income,
            expenses,
            net_change,
            balance,
        });
    }
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, day).unwrap()
    }

    fn occ(day: u32, amount: Decimal, direction: Direction) -> Occurrence {
        Occurrence {
            item_id: 1,
            name: "x".into(),
            date: d(day),
            amount,
            direction,
            category: "general".into(),
            recurring: false,
        }
    }

    #[test]
    fn scenario_spreads_expense_over_period() {
        let s = test_scenario(dec!(50), 10, dec!(150)).unwrap();
        assert_eq!(s.impact_per_day, dec!(15));
        assert_eq!(s.new_clip, dec!(35));
        assert_eq!(s.recommendation, Recommendation::Comfortable);
    }

    #[test]
    fn scenario_recommendation_bands() {
        assert_eq!(test_scenario(dec!(20), 1, dec!(0)).unwrap().recommendation, Recommendation::Comfortable);
        assert_eq!(test_scenario(dec!(20), 1, dec!(1)).unwrap().recommendation, Recommendation::Tight);
        assert_eq!(test_scenario(dec!(0), 1, dec!(10)).unwrap().recommendation, Recommendation::SlightlyOver);
        assert_eq!(test_scenario(dec!(0), 1, dec!(11)).unwrap().recommendation, Recommendation::Significant);
    }

    #[test]
    fn scenario_validates_inputs() {
        assert_eq!(test_scenario(dec!(10), 0, dec!(5)), Err(ClipError::InvalidPeriod(0)));
        assert!(matches!(test_scenario(dec!(10), 3, dec!(-5)), Err(ClipError::InvalidAmount(_))));
    }

    #[test]
    fn timeline_tracks_running_balance() {
        let occurrences = vec![
            occ(2, dec!(100), Direction::Expense),
            occ(2, dec!(40), Direction::Income),
            occ(4, dec!(500), Direction::Income),
        ];
        let tl = cash_flow_timeline(dec!(1000), &occurrences, d(1), 5).unwrap();
        assert_eq!(tl.len(), 5);
        assert_eq!(tl[0].balance, dec!(1000));
        assert_eq!(tl[1].net_change, dec!(-60));
        assert_eq!(tl[1].balance, dec!(940));
        assert_eq!(tl[3].balance, dec!(1440));
        assert_eq!(tl[4].date, d(5));
    }

    #[test]
    fn timeline_overflow_is_an_error() {
        let occurrences = vec![occ(1, dec!(1), Direction::Income)];
        assert!(matches!(
            cash_flow_timeline(Decimal::MAX, &occurrences, d(1), 3),
            Err(ClipError::InvalidAmount(_))
        ));
        let end = NaiveDate::MAX - Duration::days(1);
        assert_eq!(
            cash_flow_timeline(dec!(0), &[], end, 5),
            Err(ClipError::InvalidPeriod(5))
        );
        assert!(matches!(
            test_scenario(Decimal::MIN, 1, dec!(1)),
            Err(ClipError::InvalidAmount(_))
        ));
    }
}
