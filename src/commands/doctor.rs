// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::balance::latest_snapshot;
use crate::commands::ledger::load_items;
use crate::commands::performance::{load_records, load_streak, unlocked_codes};
use crate::engine::achievements::find;
use crate::engine::streak::replay_streak;
use crate::utils::{pretty_table, today_or};
use anyhow::Result;
use rusqlite::Connection;
use tracing::warn;

/// Collect `(issue, detail)` pairs describing inconsistent stored state.
pub fn find_issues(conn: &Connection, today: chrono::NaiveDate) -> Result<Vec<(String, String)>> {
    let mut issues = Vec::new();

    // 1) Stored streak must match a replay of the history
    let stored = load_streak(conn)?;
    match replay_streak(&load_records(conn)?) {
        Ok(replayed) if replayed != stored => issues.push((
            "streak_mismatch".to_string(),
            format!(
                "stored {}/{} vs replayed {}/{}",
                stored.current_streak,
                stored.longest_streak,
                replayed.current_streak,
                replayed.longest_streak
            ),
        )),
        Ok(_) => {}
        Err(e) => issues.push(("history_unreplayable".to_string(), e.to_string())),
    }

    // 2) One-time items in the past that were never settled
    for item in load_items(conn)? {
        if !item.is_recurring() && !item.settled && item.occurs_on < today {
            issues.push((
                "past_due_unsettled".to_string(),
                format!("#{} {} on {}", item.id, item.name, item.occurs_on),
            ));
        }
    }

    // 3) Balance
    match latest_snapshot(conn)? {
        None => issues.push(("no_balance".to_string(), "no balance snapshot recorded".to_string())),
        Some(s) if s.as_of > today => issues.push((
            "future_balance".to_string(),
            format!("latest snapshot is dated {}", s.as_of),
        )),
        Some(_) => {}
    }

    // 4) Unlocks that no longer exist in the catalog
    let mut codes: Vec<String> = unlocked_codes(conn)?.into_iter().collect();
    codes.sort();
    for code in codes {
        if find(&code).is_none() {
            issues.push(("unknown_achievement".to_string(), code));
        }
    }

    for (issue, detail) in &issues {
        warn!(issue = %issue, detail = %detail, "doctor finding");
    }
    Ok(issues)
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_or(sub)?;
    let issues = find_issues(conn, today)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues.into_iter().map(|(i, d)| vec![i, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
