// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{ClipError, ClipResult};
use crate::models::{PerformanceCategory, PerformanceRecord};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

// Inclusive upper bounds of spend/target for each band.
const EXCELLENT_MAX: Decimal = dec!(0.70);
const GOOD_MAX: Decimal = dec!(0.90);
const NEUTRAL_MAX: Decimal = dec!(1.10);
const POOR_MAX: Decimal = dec!(1.30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayScore {
    pub score: u8,
    pub category: PerformanceCategory,
}

pub fn category_for_ratio(ratio: Decimal) -> PerformanceCategory {
    if ratio <= EXCELLENT_MAX {
        PerformanceCategory::Excellent
    } else if ratio <= GOOD_MAX {
        PerformanceCategory::Good
    } else if ratio <= NEUTRAL_MAX {
        PerformanceCategory::Neutral
    } else if ratio <= POOR_MAX {
        PerformanceCategory::Poor
    } else {
        PerformanceCategory::Critical
    }
}

/// 100 when nothing was spent, 0 at twice the target, linear in between.
pub fn score_for_ratio(ratio: Decimal) -> u8 {
    // a ratio too large to scale is far past the zero point
    let Some(raw) = dec!(50)
        .checked_mul(ratio)
        .and_then(|penalty| dec!(100).checked_sub(penalty))
    else {
        return 0;
    };
    raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, dec!(100))
        .to_u8()
        .unwrap_or(0)
}

/// Score a finished day of spending against its target.
pub fn score_day(target_allowance: Decimal, actual_spend: Decimal) -> ClipResult<DayScore> {
    if target_allowance <= Decimal::ZERO {
        return Err(ClipError::InvalidTarget(target_allowance));
    }
    if actual_spend < Decimal::ZERO {
        return Err(ClipError::negative("actual spend", actual_spend));
    }
    match actual_spend.checked_div(target_allowance) {
        Some(ratio) => Ok(DayScore {
            score: score_for_ratio(ratio),
            category: category_for_ratio(ratio),
        }),
        // spend dwarfs the target by more than a Decimal can express
        None => Ok(DayScore {
            score: 0,
            category: PerformanceCategory::Critical,
        }),
    }
}

pub fn build_record(
    date: NaiveDate,
    target_allowance: Decimal,
    actual_spend: Decimal,
) -> ClipResult<PerformanceRecord> {
    let DayScore { score, category } = score_day(target_allowance, actual_spend)?;
    Ok(PerformanceRecord {
        date,
        target_allowance,
        actual_spend,
        saved_amount: target_allowance
            .checked_sub(actual_spend)
            .ok_or_else(|| ClipError::overflow("saved amount"))?,
        score,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use PerformanceCategory::*;

    fn cat(target: Decimal, actual: Decimal) -> PerformanceCategory {
        score_day(target, actual).unwrap().category
    }

    #[test]
    fn band_boundaries_are_inclusive() {
        assert_eq!(cat(dec!(100), dec!(70)), Excellent);
        assert_eq!(cat(dec!(100), dec!(71)), Good);
        assert_eq!(cat(dec!(100), dec!(90)), Good);
        assert_eq!(cat(dec!(100), dec!(91)), Neutral);
        assert_eq!(cat(dec!(100), dec!(110)), Neutral);
        assert_eq!(cat(dec!(100), dec!(111)), Poor);
        assert_eq!(cat(dec!(100), dec!(130)), Poor);
        assert_eq!(cat(dec!(100), dec!(131)), Critical);
        // Same ratios with a target that is not a round number.
        assert_eq!(cat(dec!(40), dec!(28)), Excellent);
        assert_eq!(cat(dec!(40), dec!(36)), Good);
        assert_eq!(cat(dec!(40), dec!(44)), Neutral);
        assert_eq!(cat(dec!(40), dec!(52)), Poor);
    }

    #[test]
    fn score_extremes_clamp() {
        assert_eq!(
            score_day(dec!(100), dec!(0)).unwrap(),
            DayScore { score: 100, category: Excellent }
        );
        assert_eq!(
            score_day(dec!(100), dec!(200)).unwrap(),
            DayScore { score: 0, category: Critical }
        );
        assert_eq!(score_day(dec!(100), dec!(500)).unwrap().score, 0);
    }

    #[test]
    fn score_rounds_half_away_from_zero() {
        // 100 - 50 * 0.91 = 54.5
        assert_eq!(score_day(dec!(100), dec!(91)).unwrap().score, 55);
        assert_eq!(score_day(dec!(100), dec!(50)).unwrap().score, 75);
    }

    #[test]
    fn score_never_increases_with_spend() {
        let mut last = u8::MAX;
        for spend in 0..=250 {
            let s = score_day(dec!(100), Decimal::from(spend)).unwrap().score;
            assert!(s <= last, "score rose at spend {}", spend);
            last = s;
        }
    }

    #[test]
    fn invalid_inputs_fail() {
        assert_eq!(score_day(dec!(0), dec!(5)), Err(ClipError::InvalidTarget(dec!(0))));
        assert_eq!(score_day(dec!(-3), dec!(5)), Err(ClipError::InvalidTarget(dec!(-3))));
        assert!(matches!(score_day(dec!(10), dec!(-1)), Err(ClipError::InvalidAmount(_))));
    }

    #[test]
    fn extreme_spend_scores_critical_instead_of_overflowing() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        assert_eq!(
            score_day(dec!(1), huge).unwrap(),
            DayScore { score: 0, category: Critical }
        );
        // the ratio itself does not fit in a Decimal
        let tiny = Decimal::new(1, 28);
        assert_eq!(
            score_day(tiny, Decimal::MAX).unwrap(),
            DayScore { score: 0, category: Critical }
        );
        assert_eq!(score_day(Decimal::MAX, Decimal::MAX).unwrap().score, 50);

        let date = NaiveDate::from_ymd_opt(2025, 5, 6).unwrap();
        let rec = build_record(date, dec!(1), huge).unwrap();
        assert_eq!(rec.saved_amount, dec!(1) - huge);
        assert_eq!(rec.category, Critical);
    }

    #[test]
    fn record_tracks_saved_amount() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let rec = build_record(date, dec!(50), dec!(65)).unwrap();
        assert_eq!(rec.saved_amount, dec!(-15));
        assert_eq!(rec.category, Poor);
        assert_eq!(rec, build_record(date, dec!(50), dec!(65)).unwrap());
    }
}
