// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::{Deserialize, Serialize};

const BASE_XP: u32 = 10;
const STREAK_BONUS_XP: u32 = 15;
const XP_PER_LEVEL: u32 = 100;

/// XP earned for logging a day: a flat base, a bonus by score band and a
/// bonus when the day kept the streak alive.
pub fn xp_for_performance(score: u8, qualifies_for_streak: bool) -> u32 {
    let band = match score {
        90.. => 50,
        80..=89 => 30,
        70..=79 => 20,
        60..=69 => 10,
        _ => 0,
    };
    let streak = if qualifies_for_streak { STREAK_BONUS_XP } else { 0 };
    BASE_XP + band + streak
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub current_level: u32,
    pub total_xp: u64,
    pub current_level_xp: u32,
    pub xp_to_next_level: u32,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            current_level: 1,
            total_xp: 0,
            current_level_xp: 0,
            xp_to_next_level: XP_PER_LEVEL,
        }
    }
}

impl Level {
    /// Add XP, carrying any overflow into as many level-ups as it covers.
    /// Returns true when at least one level was gained.
    pub fn add_xp(&mut self, points: u32) -> bool {
        let start = self.current_level;
        self.total_xp += u64::from(points);
        let mut pool = self.current_level_xp.saturating_add(points);
        while pool >= self.xp_to_next_level {
            pool -= self.xp_to_next_level;
            self.current_level += 1;
            self.xp_to_next_level = XP_PER_LEVEL.saturating_mul(self.current_level);
        }
        self.current_level_xp = pool;
        self.current_level > start
    }

    pub fn from_total_xp(total: u64) -> Self {
        let mut level = Self::default();
        let mut remaining = total;
        while remaining > 0 {
            let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
            level.add_xp(chunk);
            remaining -= u64::from(chunk);
        }
        level
    }
}
