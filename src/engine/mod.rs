// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure calculations: no I/O, no shared state. Storage and presentation
//! live in `commands`.

pub mod achievements;
pub mod allowance;
pub mod cashflow;
pub mod progression;
pub mod recurrence;
pub mod scoring;
pub mod streak;
pub mod summary;

pub use allowance::{DailyAllowanceResult, compute_daily_allowance};
pub use recurrence::{Frequency, RecurrenceRule, project_occurrences};
pub use scoring::{DayScore, score_day};
pub use streak::{StreakState, update_streak};
