// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use clip::commands::{balance, clip as daily, ledger};
use clip::config::{self, Settings};
use clip::engine::allowance::{PeriodMode, aggregate_window};
use clip::engine::cashflow::{Recommendation, cash_flow_timeline, test_scenario};
use clip::engine::recurrence::{Frequency, RecurrenceRule};
use clip::models::{Direction, LedgerItem};
use clip::{cli, db};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn item(name: &str, direction: Direction, amount: Decimal, on: NaiveDate, every: Option<Frequency>) -> LedgerItem {
    LedgerItem {
        id: 0,
        name: name.into(),
        amount,
        occurs_on: on,
        direction,
        recurrence: every.map(|f| RecurrenceRule::new(f, 1).unwrap()),
        category: "general".into(),
        settled: false,
    }
}

fn seeded() -> Connection {
    let conn = db::open_in_memory().unwrap();
    balance::set_balance(&conn, dec!(1100), d(2025, 3, 1)).unwrap();
    ledger::insert_item(
        &conn,
        &item("Salary", Direction::Income, dec!(2000), d(2025, 3, 14), Some(Frequency::Biweekly)),
    )
    .unwrap();
    ledger::insert_item(
        &conn,
        &item("Rent", Direction::Expense, dec!(500), d(2025, 3, 10), Some(Frequency::Monthly)),
    )
    .unwrap();
    conn
}

#[test]
fn next_paycheck_clip_counts_the_paycheck_day() {
    let conn = seeded();
    let report = daily::report_for(&conn, &Settings::default(), d(2025, 3, 1), None).unwrap();
    assert_eq!(report.period.end, d(2025, 3, 14));
    assert_eq!(report.allowance.days_remaining, 13);
    assert_eq!(report.totals.expected_income, dec!(2000));
    assert_eq!(report.totals.upcoming_expenses, dec!(500));
    assert_eq!(report.allowance.net_available, dec!(2600));
    assert_eq!(report.allowance.daily_clip, dec!(200));
}

#[test]
fn end_of_month_mode_from_settings() {
    let conn = seeded();
    config::set_setting(&conn, config::PERIOD_MODE, "end_of_month").unwrap();
    let settings = Settings::load(&conn).unwrap();
    assert_eq!(settings.period_mode, PeriodMode::EndOfMonth);

    let report = daily::report_for(&conn, &settings, d(2025, 3, 1), None).unwrap();
    assert_eq!(report.period.end, d(2025, 4, 1));
    assert_eq!(report.allowance.days_remaining, 31);
    // 03-14 and 03-28 paychecks, one rent
    assert_eq!(report.totals.expected_income, dec!(4000));
    assert_eq!(report.totals.upcoming_expenses, dec!(500));

    let paycheck = daily::report_for(&conn, &settings, d(2025, 3, 1), Some(PeriodMode::NextPaycheck))
        .unwrap();
    assert_eq!(paycheck.period.mode, PeriodMode::NextPaycheck);
}

#[test]
fn settled_items_drop_out_of_the_window() {
    let conn = seeded();
    conn.execute("UPDATE ledger_items SET settled=1 WHERE name='Rent'", []).unwrap();
    let report = daily::report_for(&conn, &Settings::default(), d(2025, 3, 1), None).unwrap();
    assert_eq!(report.totals.upcoming_expenses, Decimal::ZERO);
    assert_eq!(report.allowance.net_available, dec!(3100));
}

#[test]
fn no_data_falls_back_to_a_week() {
    let conn = db::open_in_memory().unwrap();
    let report = daily::report_for(&conn, &Settings::default(), d(2025, 6, 10), None).unwrap();
    assert_eq!(report.period.end, d(2025, 6, 17));
    assert_eq!(report.allowance.days_remaining, 7);
    assert_eq!(report.allowance.daily_clip, Decimal::ZERO);
}

#[test]
fn scenario_spreads_expense_over_remaining_days() {
    let conn = seeded();
    let report = daily::report_for(&conn, &Settings::default(), d(2025, 3, 1), None).unwrap();
    let s = test_scenario(report.allowance.daily_clip, report.allowance.days_remaining, dec!(130))
        .unwrap();
    assert_eq!(s.impact_per_day, dec!(10));
    assert_eq!(s.new_clip, dec!(190));
    assert_eq!(s.recommendation, Recommendation::Comfortable);
    assert!(test_scenario(dec!(10), 13, dec!(-1)).is_err());
}

#[test]
fn timeline_tracks_running_balance() {
    let conn = seeded();
    let items = ledger::load_items(&conn).unwrap();
    let start = d(2025, 3, 1);
    let totals = aggregate_window(&items, start, d(2025, 3, 15)).unwrap();
    let days = cash_flow_timeline(dec!(1100), &totals.occurrences, start, 15).unwrap();
    assert_eq!(days.len(), 15);
    assert_eq!(days[8].date, d(2025, 3, 9));
    assert_eq!(days[8].balance, dec!(1100));
    assert_eq!(days[9].expenses, dec!(500));
    assert_eq!(days[9].balance, dec!(600));
    assert_eq!(days[13].income, dec!(2000));
    assert_eq!(days[14].balance, dec!(2600));
}

#[test]
fn cli_handlers_accept_overrides() {
    let conn = seeded();
    let settings = Settings::default();
    let m = cli::build_cli().get_matches_from([
        "clip", "today", "--today", "2025-03-01", "--mode", "end-of-month", "--json",
    ]);
    let (_, sub) = m.subcommand().unwrap();
    daily::handle_today(&conn, &settings, sub).unwrap();

    let m = cli::build_cli().get_matches_from(["clip", "scenario", "--amount", "50", "--today", "2025-03-01"]);
    let (_, sub) = m.subcommand().unwrap();
    daily::handle_scenario(&conn, &settings, sub).unwrap();

    let m = cli::build_cli().get_matches_from(["clip", "timeline", "--days", "5", "--today", "2025-03-01"]);
    let (_, sub) = m.subcommand().unwrap();
    daily::handle_timeline(&conn, &settings, sub).unwrap();

    let m = cli::build_cli().get_matches_from(["clip", "today", "--mode", "fortnight"]);
    let (_, sub) = m.subcommand().unwrap();
    assert!(daily::handle_today(&conn, &settings, sub).is_err());
}

#[test]
fn overflowing_balance_is_an_error_not_a_crash() {
    let conn = db::open_in_memory().unwrap();
    balance::set_balance(&conn, Decimal::MAX, d(2025, 3, 1)).unwrap();
    ledger::insert_item(&conn, &item("Bonus", Direction::Income, dec!(1), d(2025, 3, 5), None))
        .unwrap();
    let err = daily::report_for(&conn, &Settings::default(), d(2025, 3, 1), None).unwrap_err();
    assert!(format!("{:#}", err).contains("out of range"));
}
