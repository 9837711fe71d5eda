// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Achievement catalog and unlock rules.
//!
//! Every requirement is evaluated against the date-ordered performance
//! history plus the current streak, so progress can be recomputed at any
//! time without extra bookkeeping.

use crate::engine::streak::StreakState;
use crate::models::{PerformanceCategory, PerformanceRecord};
use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    StreakDays,
    TotalSaved,
    PerformanceScore,
    ConsecutiveExcellent,
    ConsecutiveGoodOrExcellent,
    TotalTrainingDays,
    ZeroSpendDay,
    HighSavePercentage,
    StreakComeback,
    JanuaryStarter,
    DecemberStreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub code: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub tier: Tier,
    pub requirement: Requirement,
    pub required: Decimal,
    pub points: u32,
}

macro_rules! achievement {
    ($code:expr, $title:expr, $desc:expr, $cat:expr, $tier:ident, $req:ident, $value:expr, $points:expr) => {
        Achievement {
            code: $code,
            title: $title,
            description: $desc,
            category: $cat,
            tier: Tier::$tier,
            requirement: Requirement::$req,
            required: $value,
            points: $points,
        }
    };
}

pub static CATALOG: Lazy<Vec<Achievement>> = Lazy::new(|| {
    vec![
        achievement!("streak_1", "First Steps", "Complete your first day of financial training", "streak", Bronze, StreakDays, dec!(1), 50),
        achievement!("streak_3", "Building Momentum", "Stay under your target for 3 consecutive days", "streak", Bronze, StreakDays, dec!(3), 100),
        achievement!("streak_7", "Week Warrior", "Complete a full week of financial discipline", "streak", Silver, StreakDays, dec!(7), 250),
        achievement!("streak_14", "Fortnight Fighter", "Two weeks of consistent financial performance", "streak", Silver, StreakDays, dec!(14), 400),
        achievement!("streak_30", "Monthly Master", "Achieve a 30-day streak of financial excellence", "streak", Gold, StreakDays, dec!(30), 750),
        achievement!("streak_100", "Century Champion", "Legendary 100-day streak of financial discipline", "streak", Platinum, StreakDays, dec!(100), 2000),
        achievement!("saved_100", "First $100", "Save your first $100 through daily discipline", "savings", Bronze, TotalSaved, dec!(100), 150),
        achievement!("saved_500", "Emergency Buffer", "Build a $500 safety net", "savings", Silver, TotalSaved, dec!(500), 300),
        achievement!("saved_1000", "Thousand Club", "Join the elite $1,000 savers club", "savings", Silver, TotalSaved, dec!(1000), 500),
        achievement!("saved_5000", "Emergency Fund Hero", "Save $5,000 through daily discipline", "savings", Gold, TotalSaved, dec!(5000), 1000),
        achievement!("saved_10000", "Financial Freedom Fighter", "Save $10,000 through daily discipline", "savings", Platinum, TotalSaved, dec!(10000), 2500),
        achievement!("perfect_score", "Perfect Score", "Achieve a perfect 100 performance score", "performance", Silver, PerformanceScore, dec!(100), 200),
        achievement!("excellent_7", "Excellence Streak", "Score excellent performance 7 days in a row", "performance", Gold, ConsecutiveExcellent, dec!(7), 600),
        achievement!("consistent_14", "Consistency King", "Maintain good or excellent performance for 2 weeks", "performance", Gold, ConsecutiveGoodOrExcellent, dec!(14), 800),
        achievement!("days_7", "Training Rookie", "Complete 7 total days of financial training", "milestone", Bronze, TotalTrainingDays, dec!(7), 100),
        achievement!("days_30", "Dedicated Athlete", "Complete 30 total days of financial training", "milestone", Silver, TotalTrainingDays, dec!(30), 300),
        achievement!("days_100", "Financial Veteran", "Complete 100 total days of financial training", "milestone", Gold, TotalTrainingDays, dec!(100), 750),
        achievement!("days_365", "Legendary Trainer", "Complete 365 total days of financial training", "milestone", Platinum, TotalTrainingDays, dec!(365), 2000),
        achievement!("zero_spend", "Zero Spend Day", "Complete a day without spending anything", "challenge", Silver, ZeroSpendDay, dec!(1), 300),
        achievement!("big_saver", "Big Saver", "Save 80% of your daily target in one day", "challenge", Gold, HighSavePercentage, dec!(80), 400),
        achievement!("comeback", "Comeback Champion", "Restart your streak after breaking a 7+ day streak", "challenge", Silver, StreakComeback, dec!(7), 250),
        achievement!("january_starter", "New Year New Me", "Start your financial training journey in January", "special", Bronze, JanuaryStarter, dec!(1), 100),
        achievement!("december_streak", "Holiday Discipline", "Maintain a 7+ day streak in December", "special", Gold, DecemberStreak, dec!(7), 500),
    ]
});

pub fn find(code: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.code == code)
}

/// Length of the run of consecutive days, ending at the latest record,
/// whose category satisfies `pred`.
fn trailing_run(history: &[PerformanceRecord], pred: impl Fn(PerformanceCategory) -> bool) -> u32 {
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for rec in history.iter().rev() {
        let adjacent = prev.is_none_or(|p| rec.date + Duration::days(1) == p);
        if !adjacent || !pred(rec.category) {
            break;
        }
        run += 1;
        prev = Some(rec.date);
    }
    run
}

/// Lengths of every run of consecutive qualifying days, in date order.
fn qualifying_runs<'a>(history: impl IntoIterator<Item = &'a PerformanceRecord>) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for rec in history {
        let adjacent = prev.is_some_and(|p| p + Duration::days(1) == rec.date);
        if !adjacent && run > 0 {
            runs.push(run);
            run = 0;
        }
        if rec.category.qualifies_for_streak() {
            run += 1;
        } else if run > 0 {
            runs.push(run);
            run = 0;
        }
        prev = Some(rec.date);
    }
    if run > 0 {
        runs.push(run);
    }
    runs
}

/// `saved / target` as a percentage, saturating at the Decimal bounds.
fn save_percentage(saved: Decimal, target: Decimal) -> Decimal {
    saved
        .checked_div(target)
        .map(|ratio| ratio.saturating_mul(dec!(100)))
        .unwrap_or(if saved.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// Current value of the measured quantity for a requirement.
pub fn progress_value(
    requirement: Requirement,
    history: &[PerformanceRecord],
    streak: &StreakState,
) -> Decimal {
    match requirement {
        Requirement::StreakDays => Decimal::from(streak.current_streak),
        Requirement::TotalSaved => history
            .iter()
            .map(|r| r.saved_amount)
            .filter(|s| *s > Decimal::ZERO)
            .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s)),
        Requirement::PerformanceScore => history
            .iter()
            .map(|r| Decimal::from(r.score))
            .max()
            .unwrap_or(Decimal::ZERO),
        Requirement::ConsecutiveExcellent => Decimal::from(trailing_run(history, |c| {
            c == PerformanceCategory::Excellent
        })),
        Requirement::ConsecutiveGoodOrExcellent => {
            Decimal::from(trailing_run(history, PerformanceCategory::qualifies_for_streak))
        }
        Requirement::TotalTrainingDays => Decimal::from(history.len()),
        Requirement::ZeroSpendDay => Decimal::from(
            history
                .iter()
                .filter(|r| r.actual_spend.is_zero())
                .count(),
        ),
        Requirement::HighSavePercentage => history
            .iter()
            .filter(|r| r.target_allowance > Decimal::ZERO)
            .map(|r| save_percentage(r.saved_amount, r.target_allowance))
            .max()
            .unwrap_or(Decimal::ZERO),
        Requirement::StreakComeback => {
            if !streak.is_active() {
                return Decimal::ZERO;
            }
            let runs = qualifying_runs(history);
            // The last run is the live streak; anything before it was broken.
            let broken = runs.len().saturating_sub(1);
            Decimal::from(runs[..broken].iter().copied().max().unwrap_or(0))
        }
        Requirement::JanuaryStarter => match history.first() {
            Some(first) if first.date.month() == 1 => Decimal::ONE,
            _ => Decimal::ZERO,
        },
        Requirement::DecemberStreak => {
            let best = history
                .iter()
                .map(|r| r.date.year())
                .collect::<HashSet<_>>()
                .into_iter()
                .filter_map(|year| {
                    qualifying_runs(
                        history
                            .iter()
                            .filter(move |r| r.date.year() == year && r.date.month() == 12),
                    )
                    .into_iter()
                    .max()
                })
                .max()
                .unwrap_or(0);
            Decimal::from(best)
        }
    }
}

pub fn is_met(a: &Achievement, history: &[PerformanceRecord], streak: &StreakState) -> bool {
    progress_value(a.requirement, history, streak) >= a.required
}

/// Progress toward an achievement as a percentage, capped at 100 and
/// rounded to one decimal.
pub fn progress_percent(a: &Achievement, history: &[PerformanceRecord], streak: &StreakState) -> f64 {
    if a.required <= Decimal::ZERO {
        return 100.0;
    }
    let pct = (progress_value(a.requirement, history, streak) / a.required)
        .saturating_mul(dec!(100))
        .min(dec!(100))
        .max(Decimal::ZERO)
        .round_dp(1);
    pct.to_f64().unwrap_or(0.0)
}

/// Achievements satisfied by the history that are not in `already`.
pub fn newly_unlocked(
    history: &[PerformanceRecord],
    streak: &StreakState,
    already: &HashSet<String>,
) -> Vec<&'static Achievement> {
    CATALOG
        .iter()
        .filter(|a| !already.contains(a.code))
        .filter(|a| is_met(a, history, streak))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring::build_record;
    use crate::engine::streak::replay_streak;

    fn rec(y: i32, m: u32, d: u32, spend: Decimal) -> PerformanceRecord {
        build_record(NaiveDate::from_ymd_opt(y, m, d).unwrap(), dec!(100), spend).unwrap()
    }

    fn codes(list: &[&Achievement]) -> Vec<&'static str> {
        list.iter().map(|a| a.code).collect()
    }

    #[test]
    fn catalog_codes_are_unique() {
        let set: HashSet<_> = CATALOG.iter().map(|a| a.code).collect();
        assert_eq!(set.len(), CATALOG.len());
        assert!(find("streak_7").is_some());
        assert!(find("early_bird").is_none());
    }

    #[test]
    fn first_day_unlocks_starter_badges() {
        let history = vec![rec(2025, 1, 2, dec!(0))];
        let streak = replay_streak(&history).unwrap();
        let got = newly_unlocked(&history, &streak, &HashSet::new());
        let got = codes(&got);
        assert!(got.contains(&"streak_1"));
        assert!(got.contains(&"perfect_score"));
        assert!(got.contains(&"zero_spend"));
        assert!(got.contains(&"big_saver"));
        assert!(got.contains(&"saved_100"));
        assert!(got.contains(&"january_starter"));
        assert!(!got.contains(&"streak_3"));
    }

    #[test]
    fn unlocked_are_not_reported_twice() {
        let history = vec![rec(2025, 3, 1, dec!(50))];
        let streak = replay_streak(&history).unwrap();
        let already: HashSet<String> = ["streak_1".to_string()].into_iter().collect();
        let got = newly_unlocked(&history, &streak, &already);
        assert!(!codes(&got).contains(&"streak_1"));
    }

    #[test]
    fn progress_is_capped_percentage() {
        let history: Vec<_> = (1..=3).map(|d| rec(2025, 3, d, dec!(80))).collect();
        let streak = replay_streak(&history).unwrap();
        let week = find("streak_7").unwrap();
        assert!((progress_percent(week, &history, &streak) - 42.9).abs() < 1e-9);
        let first = find("streak_1").unwrap();
        assert_eq!(progress_percent(first, &history, &streak), 100.0);
        // saved 20 a day
        let saved = find("saved_100").unwrap();
        assert_eq!(progress_percent(saved, &history, &streak), 60.0);
    }

    #[test]
    fn comeback_needs_a_broken_long_streak() {
        let mut history: Vec<_> = (1..=7).map(|d| rec(2025, 3, d, dec!(50))).collect();
        history.push(rec(2025, 3, 8, dec!(150)));
        let broken = replay_streak(&history).unwrap();
        let comeback = find("comeback").unwrap();
        assert!(!is_met(comeback, &history, &broken));

        history.push(rec(2025, 3, 9, dec!(50)));
        let restarted = replay_streak(&history).unwrap();
        assert!(is_met(comeback, &history, &restarted));
    }

    #[test]
    fn consecutive_runs_respect_gaps() {
        let history = vec![
            rec(2025, 12, 1, dec!(10)),
            rec(2025, 12, 2, dec!(10)),
            rec(2025, 12, 4, dec!(10)),
        ];
        let streak = replay_streak(&history).unwrap();
        assert_eq!(
            progress_value(Requirement::ConsecutiveExcellent, &history, &streak),
            dec!(1)
        );
        assert_eq!(
            progress_value(Requirement::DecemberStreak, &history, &streak),
            dec!(2)
        );
    }

    #[test]
    fn extreme_amounts_saturate() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let history = vec![
            build_record(date, Decimal::MAX, dec!(0)).unwrap(),
            build_record(date + Duration::days(1), Decimal::MAX, dec!(0)).unwrap(),
            build_record(date + Duration::days(2), dec!(1), Decimal::MAX).unwrap(),
        ];
        let streak = replay_streak(&history).unwrap();
        assert_eq!(
            progress_value(Requirement::TotalSaved, &history, &streak),
            Decimal::MAX
        );
        assert_eq!(
            progress_value(Requirement::HighSavePercentage, &history, &streak),
            dec!(100)
        );
        let big_saver = find("big_saver").unwrap();
        assert_eq!(progress_percent(big_saver, &history, &streak), 100.0);
        assert_eq!(save_percentage(Decimal::MIN, Decimal::new(1, 28)), Decimal::MIN);
        assert_eq!(save_percentage(dec!(5), Decimal::new(1, 28)), Decimal::MAX);
    }
}
