// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::clip::{mode_override, report_for};
use crate::config::Settings;
use crate::engine::achievements::{Achievement, newly_unlocked};
use crate::engine::progression::{Level, xp_for_performance};
use crate::engine::scoring::build_record;
use crate::engine::streak::{StreakState, update_streak};
use crate::engine::summary::summarize;
use crate::models::PerformanceRecord;
use crate::utils::{
    date_column, decimal_column, fmt_money, json_flags, maybe_print_json, parse_date,
    parse_decimal, pretty_table, today_or,
};
use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

pub fn handle(conn: &mut Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => record(conn, settings, sub)?,
        Some(("history", sub)) => history(conn, settings, sub)?,
        Some(("summary", sub)) => summary(conn, settings, sub)?,
        _ => {}
    }
    Ok(())
}

/// Everything that changed when a day was recorded.
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub record: PerformanceRecord,
    pub xp_gained: u32,
    pub streak: StreakState,
    pub level: Level,
    pub leveled_up: bool,
    pub unlocked: Vec<&'static Achievement>,
}

fn record(conn: &mut Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => Local::now().date_naive(),
    };
    let spent = parse_decimal(sub.get_one::<String>("spent").unwrap())?;
    let target = match sub.get_one::<String>("target") {
        Some(s) => parse_decimal(s)?,
        None => {
            let clip = report_for(conn, settings, date, mode_override(sub)?)?
                .allowance
                .daily_clip;
            if clip <= Decimal::ZERO {
                return Err(anyhow!(
                    "No positive daily clip for {} ({}); pass --target explicitly",
                    date,
                    clip
                ));
            }
            clip
        }
    };

    let out = record_day(conn, date, target, spent)?;
    if maybe_print_json(json_flag, jsonl_flag, &out)? {
        return Ok(());
    }
    let ccy = &settings.currency;
    let r = &out.record;
    println!(
        "{}",
        pretty_table(
            &["Date", "Target", "Spent", "Saved", "Score", "Category", "XP"],
            vec![vec![
                r.date.to_string(),
                fmt_money(&r.target_allowance, ccy),
                fmt_money(&r.actual_spend, ccy),
                fmt_money(&r.saved_amount, ccy),
                r.score.to_string(),
                r.category.to_string(),
                format!("+{}", out.xp_gained),
            ]],
        )
    );
    println!(
        "Streak: {} day(s) (best {})",
        out.streak.current_streak, out.streak.longest_streak
    );
    if out.leveled_up {
        println!("Level up! Now level {}", out.level.current_level);
    }
    for a in &out.unlocked {
        println!("Achievement unlocked: {} (+{} XP)", a.title, a.points);
    }
    Ok(())
}

/// Score a day, advance the streak, award XP and unlock achievements in one
/// transaction. Each calendar day can be recorded once, in date order.
pub fn record_day(
    conn: &mut Connection,
    date: NaiveDate,
    target: Decimal,
    spent: Decimal,
) -> Result<RecordOutcome> {
    let record = build_record(date, target, spent)?;
    let tx = conn.transaction()?;

    let exists: Option<i64> = tx
        .query_row("SELECT id FROM performance WHERE date=?1", params![date.to_string()], |r| {
            r.get(0)
        })
        .optional()?;
    if exists.is_some() {
        return Err(anyhow!("Performance for {} is already recorded", date));
    }

    let previous = load_streak(&tx)?;
    let streak = update_streak(&previous, &record)
        .with_context(|| format!("Record performance for {}", date))?;
    let xp_gained = xp_for_performance(record.score, record.category.qualifies_for_streak());
    let before = Level::from_total_xp(total_xp(&tx)?);

    tx.execute(
        "INSERT INTO performance(date, target, spent, saved, score, category, xp_gained)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.date.to_string(),
            record.target_allowance.to_string(),
            record.actual_spend.to_string(),
            record.saved_amount.to_string(),
            record.score,
            record.category.as_str(),
            xp_gained
        ],
    )?;
    save_streak(&tx, &streak)?;

    let history = load_records(&tx)?;
    let already = unlocked_codes(&tx)?;
    let unlocked = newly_unlocked(&history, &streak, &already);
    for a in &unlocked {
        tx.execute(
            "INSERT INTO achievements_unlocked(code, unlocked_on, points) VALUES (?1, ?2, ?3)",
            params![a.code, date.to_string(), a.points],
        )?;
        info!(code = a.code, points = a.points, "achievement unlocked");
    }

    let level = Level::from_total_xp(total_xp(&tx)?);
    tx.commit()?;

    info!(
        %date,
        score = record.score,
        category = %record.category,
        streak = streak.current_streak,
        xp_gained,
        "performance recorded"
    );
    Ok(RecordOutcome {
        record,
        xp_gained,
        streak,
        leveled_up: level.current_level > before.current_level,
        level,
        unlocked,
    })
}

/// All records, oldest first.
pub fn load_records(conn: &Connection) -> Result<Vec<PerformanceRecord>> {
    let mut stmt = conn.prepare(
        "SELECT date, target, spent, saved, score, category FROM performance ORDER BY date",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let date: String = r.get(0)?;
        let target: String = r.get(1)?;
        let spent: String = r.get(2)?;
        let saved: String = r.get(3)?;
        let category: String = r.get(5)?;
        out.push(PerformanceRecord {
            date: date_column(&date, "performance date")?,
            target_allowance: decimal_column(&target, "target")?,
            actual_spend: decimal_column(&spent, "spent")?,
            saved_amount: decimal_column(&saved, "saved")?,
            score: r.get(4)?,
            category: category
                .parse()
                .with_context(|| format!("Invalid category stored for {}", date))?,
        });
    }
    debug!(count = out.len(), "loaded performance records");
    Ok(out)
}

fn optional_date(raw: Option<String>, what: &str) -> Result<Option<NaiveDate>> {
    raw.map(|s| date_column(&s, what)).transpose()
}

pub fn load_streak(conn: &Connection) -> Result<StreakState> {
    type Row = (u32, u32, Option<String>, Option<String>, Option<String>, u32);
    let row: Option<Row> = conn
        .query_row(
            "SELECT current_streak, longest_streak, last_active_date, last_record_date,
                    streak_start_date, total_days
             FROM streak_state WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
        )
        .optional()?;
    match row {
        Some((current, longest, active, last, start, total)) => Ok(StreakState {
            current_streak: current,
            longest_streak: longest,
            last_active_date: optional_date(active, "last active date")?,
            last_record_date: optional_date(last, "last record date")?,
            streak_start_date: optional_date(start, "streak start date")?,
            total_days: total,
        }),
        None => Ok(StreakState::default()),
    }
}

pub fn save_streak(conn: &Connection, s: &StreakState) -> Result<()> {
    conn.execute(
        "INSERT INTO streak_state(id, current_streak, longest_streak, last_active_date,
                                  last_record_date, streak_start_date, total_days)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            current_streak=excluded.current_streak,
            longest_streak=excluded.longest_streak,
            last_active_date=excluded.last_active_date,
            last_record_date=excluded.last_record_date,
            streak_start_date=excluded.streak_start_date,
            total_days=excluded.total_days",
        params![
            s.current_streak,
            s.longest_streak,
            s.last_active_date.map(|d| d.to_string()),
            s.last_record_date.map(|d| d.to_string()),
            s.streak_start_date.map(|d| d.to_string()),
            s.total_days
        ],
    )?;
    Ok(())
}

/// XP from recorded days plus achievement points.
pub fn total_xp(conn: &Connection) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT (SELECT COALESCE(SUM(xp_gained), 0) FROM performance)
              + (SELECT COALESCE(SUM(points), 0) FROM achievements_unlocked)",
        [],
        |r| r.get(0),
    )?;
    u64::try_from(total).with_context(|| format!("Negative XP total {}", total))
}

pub fn unlocked_codes(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT code FROM achievements_unlocked")?;
    let codes = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<HashSet<_>>>()?;
    Ok(codes)
}

#[derive(Serialize)]
struct HistoryRow {
    date: String,
    target: String,
    spent: String,
    saved: String,
    score: u8,
    category: String,
    xp: u32,
}

fn history(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    let mut stmt = conn.prepare(
        "SELECT date, target, spent, saved, score, category, xp_gained
         FROM performance ORDER BY date DESC",
    )?;
    let data = stmt
        .query_map([], |r| {
            Ok(HistoryRow {
                date: r.get(0)?,
                target: r.get(1)?,
                spent: r.get(2)?,
                saved: r.get(3)?,
                score: r.get(4)?,
                category: r.get(5)?,
                xp: r.get(6)?,
            })
        })?
        .take(limit)
        .collect::<rusqlite::Result<Vec<_>>>()?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let ccy = &settings.currency;
        let rows = data
            .into_iter()
            .map(|h| {
                vec![
                    h.date,
                    format!("{} {}", ccy, h.target),
                    format!("{} {}", ccy, h.spent),
                    format!("{} {}", ccy, h.saved),
                    h.score.to_string(),
                    h.category,
                    h.xp.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Target", "Spent", "Saved", "Score", "Category", "XP"],
                rows
            )
        );
    }
    Ok(())
}

fn summary(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let today = today_or(sub)?;
    let days = *sub.get_one::<i64>("days").unwrap();
    let s = summarize(&load_records(conn)?, today, days);
    if maybe_print_json(json_flag, jsonl_flag, &s)? {
        return Ok(());
    }
    let latest = match &s.latest {
        Some(r) => format!("{} score {} ({})", r.date, r.score, r.category),
        None => "-".into(),
    };
    println!(
        "{}",
        pretty_table(
            &["Metric", "Value"],
            vec![
                vec!["Days tracked".into(), s.days_tracked.to_string()],
                vec!["Total saved".into(), fmt_money(&s.total_saved, &settings.currency)],
                vec!["Average score".into(), s.average_score.to_string()],
                vec!["Last 7 average".into(), s.week_average.to_string()],
                vec!["Personal best".into(), s.personal_best.to_string()],
                vec!["Trend".into(), format!("{:?}", s.trend)],
                vec!["Latest".into(), latest],
            ],
        )
    );
    Ok(())
}

pub fn handle_streak(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    #[derive(Serialize)]
    struct Status {
        streak: StreakState,
        level: Level,
    }
    let (json_flag, jsonl_flag) = json_flags(sub);
    let status = Status {
        streak: load_streak(conn)?,
        level: Level::from_total_xp(total_xp(conn)?),
    };
    if maybe_print_json(json_flag, jsonl_flag, &status)? {
        return Ok(());
    }
    let s = &status.streak;
    let l = &status.level;
    let date_or_dash = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
    println!(
        "{}",
        pretty_table(
            &["Metric", "Value"],
            vec![
                vec!["Current streak".into(), s.current_streak.to_string()],
                vec!["Longest streak".into(), s.longest_streak.to_string()],
                vec!["Streak started".into(), date_or_dash(s.streak_start_date)],
                vec!["Last active".into(), date_or_dash(s.last_active_date)],
                vec!["Days recorded".into(), s.total_days.to_string()],
                vec!["Level".into(), l.current_level.to_string()],
                vec![
                    "XP".into(),
                    format!("{} / {} (total {})", l.current_level_xp, l.xp_to_next_level, l.total_xp),
                ],
            ],
        )
    );
    Ok(())
}
