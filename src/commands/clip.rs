// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{balance, ledger};
use crate::config::Settings;
use crate::engine::allowance::{ClipReport, PeriodMode, aggregate_window, daily_clip_for};
use crate::engine::cashflow::{cash_flow_timeline, test_scenario};
use crate::utils::{fmt_money, json_flags, maybe_print_json, parse_decimal, pretty_table, today_or};
use anyhow::{Context, Result, anyhow};
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use tracing::{info, warn};

pub fn handle_today(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let today = today_or(sub)?;
    let report = report_for(conn, settings, today, mode_override(sub)?)?;
    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }

    let ccy = &settings.currency;
    let a = &report.allowance;
    println!(
        "{}",
        pretty_table(
            &["Item", "Value"],
            vec![
                vec!["Daily clip".into(), fmt_money(&a.daily_clip, ccy)],
                vec!["Current balance".into(), fmt_money(&report.current_balance, ccy)],
                vec!["Expected income".into(), fmt_money(&report.totals.expected_income, ccy)],
                vec!["Upcoming expenses".into(), fmt_money(&report.totals.upcoming_expenses, ccy)],
                vec!["Net available".into(), fmt_money(&a.net_available, ccy)],
                vec!["Days remaining".into(), a.days_remaining.to_string()],
                vec![
                    "Period".into(),
                    format!("{} to {} ({})", report.period.start, report.period.end, report.period.mode),
                ],
            ],
        )
    );
    if !report.totals.occurrences.is_empty() {
        let rows = report
            .totals
            .occurrences
            .iter()
            .map(|o| {
                vec![
                    o.date.to_string(),
                    o.direction.to_string(),
                    o.name.clone(),
                    fmt_money(&o.amount, ccy),
                    o.category.clone(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Date", "Kind", "Name", "Amount", "Category"], rows));
    }
    if a.daily_clip.is_sign_negative() {
        println!("Warning: planned expenses exceed available funds for this period");
    }
    Ok(())
}

pub fn handle_scenario(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let today = today_or(sub)?;
    let expense = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let report = report_for(conn, settings, today, mode_override(sub)?)?;
    let scenario = test_scenario(report.allowance.daily_clip, report.allowance.days_remaining, expense)?;
    info!(%expense, new_clip = %scenario.new_clip, "scenario evaluated");
    if !maybe_print_json(json_flag, jsonl_flag, &scenario)? {
        let ccy = &settings.currency;
        println!(
            "{}",
            pretty_table(
                &["Current clip", "New clip", "Impact / day", "Days", "Recommendation"],
                vec![vec![
                    fmt_money(&scenario.current_clip, ccy),
                    fmt_money(&scenario.new_clip, ccy),
                    fmt_money(&scenario.impact_per_day, ccy),
                    scenario.days_affected.to_string(),
                    scenario.recommendation.message().to_string(),
                ]],
            )
        );
    }
    Ok(())
}

pub fn handle_timeline(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let today = today_or(sub)?;
    let days = *sub.get_one::<u32>("days").unwrap();
    let snapshot = balance::snapshot_or_zero(conn, today)?;
    let items = ledger::load_items(conn)?;
    let end = today
        .checked_add_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| anyhow!("Timeline of {} days from {} is out of range", days, today))?;
    let totals = aggregate_window(&items, today, end)?;
    let timeline = cash_flow_timeline(snapshot.current_balance, &totals.occurrences, today, days)?;
    if !maybe_print_json(json_flag, jsonl_flag, &timeline)? {
        let ccy = &settings.currency;
        let rows = timeline
            .iter()
            .map(|d| {
                vec![
                    d.date.to_string(),
                    fmt_money(&d.income, ccy),
                    fmt_money(&d.expenses, ccy),
                    fmt_money(&d.net_change, ccy),
                    fmt_money(&d.balance, ccy),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Income", "Expenses", "Net", "Balance"], rows)
        );
    }
    Ok(())
}

pub fn mode_override(sub: &clap::ArgMatches) -> Result<Option<PeriodMode>> {
    match sub.try_get_one::<String>("mode").ok().flatten() {
        Some(s) => Ok(Some(s.parse()?)),
        None => Ok(None),
    }
}

/// Build the clip report from stored balance and ledger.
pub fn report_for(
    conn: &Connection,
    settings: &Settings,
    today: NaiveDate,
    mode: Option<PeriodMode>,
) -> Result<ClipReport> {
    let snapshot = balance::snapshot_or_zero(conn, today)?;
    if snapshot.as_of < today {
        warn!(as_of = %snapshot.as_of, %today, "balance snapshot is older than the evaluation date");
    }
    let items = ledger::load_items(conn)?;
    let mode = mode.unwrap_or(settings.period_mode);
    let report = daily_clip_for(&snapshot, &items, mode, today)
        .with_context(|| format!("Compute daily clip for {}", today))?;
    info!(
        %today,
        clip = %report.allowance.daily_clip,
        days = report.allowance.days_remaining,
        "daily clip computed"
    );
    Ok(report)
}
