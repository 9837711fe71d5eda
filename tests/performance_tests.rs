// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use clip::commands::{achievements, balance, doctor, performance};
use clip::config::Settings;
use clip::engine::streak::replay_streak;
use clip::error::ClipError;
use clip::models::PerformanceCategory;
use clip::{cli, db};
use rust_decimal_macros::dec;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
}

#[test]
fn recording_days_advances_streak_xp_and_achievements() {
    let mut conn = db::open_in_memory().unwrap();

    let first = performance::record_day(&mut conn, d(1), dec!(100), dec!(50)).unwrap();
    assert_eq!(first.record.score, 75);
    assert_eq!(first.record.category, PerformanceCategory::Excellent);
    assert_eq!(first.record.saved_amount, dec!(50));
    assert_eq!(first.xp_gained, 45);
    assert_eq!(first.streak.current_streak, 1);
    let codes: Vec<&str> = first.unlocked.iter().map(|a| a.code).collect();
    assert_eq!(codes, vec!["streak_1"]);
    assert_eq!(first.level.current_level, 1);
    assert_eq!(first.level.total_xp, 95);
    assert!(!first.leveled_up);

    let second = performance::record_day(&mut conn, d(2), dec!(100), dec!(0)).unwrap();
    assert_eq!(second.record.score, 100);
    assert_eq!(second.xp_gained, 75);
    assert_eq!(second.streak.current_streak, 2);
    let codes: Vec<&str> = second.unlocked.iter().map(|a| a.code).collect();
    assert_eq!(codes, vec!["saved_100", "perfect_score", "zero_spend", "big_saver"]);
    // 95 + 75 + 150 + 200 + 300 + 400
    assert_eq!(second.level.total_xp, 1220);
    assert_eq!(second.level.current_level, 5);
    assert_eq!(second.level.current_level_xp, 220);
    assert!(second.leveled_up);

    let poor = performance::record_day(&mut conn, d(3), dec!(100), dec!(120)).unwrap();
    assert_eq!(poor.record.category, PerformanceCategory::Poor);
    assert_eq!(poor.streak.current_streak, 0);
    assert_eq!(poor.streak.longest_streak, 2);
    assert!(poor.unlocked.is_empty());

    // skipped day 4
    let restart = performance::record_day(&mut conn, d(5), dec!(100), dec!(80)).unwrap();
    assert_eq!(restart.streak.current_streak, 1);
    assert_eq!(restart.streak.streak_start_date, Some(d(5)));
    assert_eq!(restart.streak.total_days, 4);

    let stored = performance::load_streak(&conn).unwrap();
    let replayed = replay_streak(&performance::load_records(&conn).unwrap()).unwrap();
    assert_eq!(stored, replayed);
    assert_eq!(performance::unlocked_codes(&conn).unwrap().len(), 5);
}

#[test]
fn duplicate_and_out_of_order_days_are_rejected() {
    let mut conn = db::open_in_memory().unwrap();
    performance::record_day(&mut conn, d(10), dec!(50), dec!(40)).unwrap();

    let dup = performance::record_day(&mut conn, d(10), dec!(50), dec!(10)).unwrap_err();
    assert!(dup.to_string().contains("already recorded"));

    let late = performance::record_day(&mut conn, d(9), dec!(50), dec!(10)).unwrap_err();
    assert!(matches!(
        late.downcast_ref::<ClipError>(),
        Some(ClipError::OutOfOrderRecord { .. })
    ));

    let bad_target = performance::record_day(&mut conn, d(11), dec!(0), dec!(10)).unwrap_err();
    assert!(matches!(
        bad_target.downcast_ref::<ClipError>(),
        Some(ClipError::InvalidTarget(_))
    ));

    // nothing from the failed attempts was written
    assert_eq!(performance::load_records(&conn).unwrap().len(), 1);
    assert_eq!(performance::load_streak(&conn).unwrap().total_days, 1);
}

#[test]
fn record_command_defaults_target_to_the_clip() {
    let mut conn = db::open_in_memory().unwrap();
    balance::set_balance(&conn, dec!(900), d(1)).unwrap();
    let m = cli::build_cli().get_matches_from([
        "clip", "perf", "record", "--date", "2025-04-01", "--spent", "15", "--mode", "end-of-month",
    ]);
    let (_, sub) = m.subcommand().unwrap();
    performance::handle(&mut conn, &Settings::default(), sub).unwrap();

    let records = performance::load_records(&conn).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].target_allowance, dec!(30));
    assert_eq!(records[0].score, 75);
}

#[test]
fn record_command_needs_a_positive_target() {
    let mut conn = db::open_in_memory().unwrap();
    let m = cli::build_cli().get_matches_from(["clip", "perf", "record", "--date", "2025-04-01", "--spent", "5"]);
    let (_, sub) = m.subcommand().unwrap();
    assert!(performance::handle(&mut conn, &Settings::default(), sub).is_err());
    assert!(performance::load_records(&conn).unwrap().is_empty());
}

#[test]
fn achievements_show_progress_and_unlocks() {
    let mut conn = db::open_in_memory().unwrap();
    for day in 1..=3 {
        performance::record_day(&mut conn, d(day), dec!(100), dec!(60)).unwrap();
    }
    let rows = achievements::achievement_rows(&conn).unwrap();
    let row = |code: &str| rows.iter().find(|r| r.code == code).unwrap();
    assert_eq!(row("streak_3").unlocked_on.as_deref(), Some("2025-04-03"));
    assert_eq!(row("streak_1").unlocked_on.as_deref(), Some("2025-04-01"));
    assert!((row("streak_7").progress - 42.9).abs() < 1e-9);
    assert_eq!(row("saved_100").progress, 100.0);
    assert!(row("days_7").unlocked_on.is_none());

    let m = cli::build_cli().get_matches_from(["clip", "achievements", "--unlocked", "--json"]);
    let (_, sub) = m.subcommand().unwrap();
    achievements::handle(&conn, sub).unwrap();

    let m = cli::build_cli().get_matches_from(["clip", "streak"]);
    let (_, sub) = m.subcommand().unwrap();
    performance::handle_streak(&conn, sub).unwrap();
}

#[test]
fn history_and_summary_commands_run() {
    let mut conn = db::open_in_memory().unwrap();
    for day in 1..=8 {
        performance::record_day(&mut conn, d(day), dec!(100), dec!(70)).unwrap();
    }
    let settings = Settings::default();
    for args in [
        vec!["clip", "perf", "history", "--limit", "3", "--jsonl"],
        vec!["clip", "perf", "summary", "--days", "30", "--today", "2025-04-08"],
    ] {
        let m = cli::build_cli().get_matches_from(args);
        let (_, sub) = m.subcommand().unwrap();
        performance::handle(&mut conn, &settings, sub).unwrap();
    }
    assert!(
        cli::build_cli()
            .try_get_matches_from(["clip", "perf", "summary", "--days", "0"])
            .is_err()
    );
}

#[test]
fn doctor_flags_streak_drift_and_past_due_items() {
    let mut conn = db::open_in_memory().unwrap();
    balance::set_balance(&conn, dec!(100), d(1)).unwrap();
    performance::record_day(&mut conn, d(1), dec!(100), dec!(50)).unwrap();
    assert!(doctor::find_issues(&conn, d(2)).unwrap().is_empty());

    conn.execute("UPDATE streak_state SET current_streak=9, longest_streak=9 WHERE id=1", [])
        .unwrap();
    conn.execute(
        "INSERT INTO ledger_items(name, direction, amount, occurs_on) VALUES ('Fine','expense','20','2025-03-30')",
        [],
    )
    .unwrap();
    let issues: Vec<String> = doctor::find_issues(&conn, d(2))
        .unwrap()
        .into_iter()
        .map(|(i, _)| i)
        .collect();
    assert_eq!(issues, vec!["streak_mismatch", "past_due_unsettled"]);
}

#[test]
fn backdated_record_uses_the_balance_known_on_that_day() {
    let mut conn = db::open_in_memory().unwrap();
    balance::set_balance(&conn, dec!(900), d(1)).unwrap();
    balance::set_balance(&conn, dec!(9000), d(20)).unwrap();
    let m = cli::build_cli().get_matches_from([
        "clip", "perf", "record", "--date", "2025-04-01", "--spent", "15", "--mode", "end-of-month",
    ]);
    let (_, sub) = m.subcommand().unwrap();
    performance::handle(&mut conn, &Settings::default(), sub).unwrap();

    let records = performance::load_records(&conn).unwrap();
    assert_eq!(records[0].target_allowance, dec!(30));

    let snap = balance::snapshot_or_zero(&conn, d(19)).unwrap();
    assert_eq!(snap.current_balance, dec!(900));
    let before_any = balance::snapshot_or_zero(&conn, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()).unwrap();
    assert_eq!(before_any.current_balance, dec!(0));
}

#[test]
fn overflowing_spend_scores_critical() {
    let mut conn = db::open_in_memory().unwrap();
    let m = cli::build_cli().get_matches_from([
        "clip", "perf", "record", "--date", "2025-04-01", "--spent", "10000000000000000000000000000",
        "--target", "1",
    ]);
    let (_, sub) = m.subcommand().unwrap();
    performance::handle(&mut conn, &Settings::default(), sub).unwrap();

    let records = performance::load_records(&conn).unwrap();
    assert_eq!(records[0].score, 0);
    assert_eq!(records[0].category, PerformanceCategory::Critical);
    assert_eq!(performance::load_streak(&conn).unwrap().current_streak, 0);
}
