// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::models::AccountSnapshot;
use crate::utils::{
    date_column, decimal_column, fmt_money, json_flags, maybe_print_json, parse_date,
    parse_decimal, pretty_table,
};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use tracing::{info, warn};

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let as_of = match sub.get_one::<String>("as_of") {
                Some(s) => parse_date(s)?,
                None => Local::now().date_naive(),
            };
            let snap = set_balance(conn, amount, as_of)?;
            println!(
                "Balance set to {} as of {}",
                fmt_money(&snap.current_balance, &settings.currency),
                snap.as_of
            );
        }
        Some(("show", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let snap = latest_snapshot(conn)?;
            if !maybe_print_json(json_flag, jsonl_flag, &snap)? {
                match snap {
                    Some(s) => println!(
                        "{}",
                        pretty_table(
                            &["Balance", "As of"],
                            vec![vec![
                                fmt_money(&s.current_balance, &settings.currency),
                                s.as_of.to_string()
                            ]],
                        )
                    ),
                    None => println!("No balance recorded yet; run `clip balance set --amount <X>`"),
                }
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn set_balance(conn: &Connection, amount: Decimal, as_of: NaiveDate) -> Result<AccountSnapshot> {
    conn.execute(
        "INSERT INTO balance_snapshots(as_of, balance) VALUES (?1, ?2)",
        params![as_of.to_string(), amount.to_string()],
    )?;
    info!(%amount, %as_of, "balance updated");
    Ok(AccountSnapshot {
        current_balance: amount,
        as_of,
    })
}

fn snapshot_row(row: Option<(String, String)>) -> Result<Option<AccountSnapshot>> {
    match row {
        Some((d, b)) => Ok(Some(AccountSnapshot {
            current_balance: decimal_column(&b, "balance")?,
            as_of: date_column(&d, "balance date")?,
        })),
        None => Ok(None),
    }
}

/// The newest snapshot by date, ties broken by insertion order.
pub fn latest_snapshot(conn: &Connection) -> Result<Option<AccountSnapshot>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT as_of, balance FROM balance_snapshots ORDER BY as_of DESC, id DESC LIMIT 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    snapshot_row(row)
}

/// The newest snapshot dated on or before `date`.
pub fn snapshot_on_or_before(conn: &Connection, date: NaiveDate) -> Result<Option<AccountSnapshot>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT as_of, balance FROM balance_snapshots WHERE as_of <= ?1
             ORDER BY as_of DESC, id DESC LIMIT 1",
            params![date.to_string()],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    snapshot_row(row)
}

/// Balance as known on `today`: the newest snapshot not dated after it, or
/// zero when there is none.
pub fn snapshot_or_zero(conn: &Connection, today: NaiveDate) -> Result<AccountSnapshot> {
    if let Some(newer) = latest_snapshot(conn)?.filter(|s| s.as_of > today) {
        warn!(as_of = %newer.as_of, %today, "ignoring balance snapshot dated after the evaluation date");
    }
    Ok(snapshot_on_or_before(conn, today)?.unwrap_or(AccountSnapshot {
        current_balance: Decimal::ZERO,
        as_of: today,
    }))
}
