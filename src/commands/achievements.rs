// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::performance::{load_records, load_streak};
use crate::engine::achievements::{CATALOG, progress_percent};
use crate::utils::{json_flags, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct AchievementRow {
    pub code: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub tier: String,
    pub points: u32,
    pub progress: f64,
    pub unlocked_on: Option<String>,
}

pub fn achievement_rows(conn: &Connection) -> Result<Vec<AchievementRow>> {
    let history = load_records(conn)?;
    let streak = load_streak(conn)?;
    let mut stmt = conn.prepare("SELECT code, unlocked_on FROM achievements_unlocked")?;
    let unlocked = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<HashMap<_, _>>>()?;

    Ok(CATALOG
        .iter()
        .map(|a| {
            let unlocked_on = unlocked.get(a.code).cloned();
            AchievementRow {
                code: a.code,
                title: a.title,
                description: a.description,
                tier: format!("{:?}", a.tier).to_lowercase(),
                points: a.points,
                // an unlock is permanent even if the measured value later drops
                progress: if unlocked_on.is_some() {
                    100.0
                } else {
                    progress_percent(a, &history, &streak)
                },
                unlocked_on,
            }
        })
        .collect())
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let only_unlocked = sub.get_flag("unlocked");
    let data: Vec<AchievementRow> = achievement_rows(conn)?
        .into_iter()
        .filter(|r| !only_unlocked || r.unlocked_on.is_some())
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.title.to_string(),
                    r.tier,
                    r.points.to_string(),
                    format!("{:.1}%", r.progress),
                    r.unlocked_on.unwrap_or_default(),
                    r.description.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Achievement", "Tier", "Points", "Progress", "Unlocked", "Description"],
                rows
            )
        );
    }
    Ok(())
}
