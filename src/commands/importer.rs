// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::ledger::insert_item;
use crate::engine::recurrence::RecurrenceRule;
use crate::models::{Direction, LedgerItem};
use crate::utils::{parse_date, parse_decimal};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("ledger", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let n = import_ledger(conn, path)?;
            println!("Imported {} ledger item(s) from {}", n, path);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Import `kind,name,amount,date[,every,interval,category,id,settled]` rows,
/// the layout `export ledger` writes. `id` is not reused. The file is applied
/// all-or-nothing.
pub fn import_ledger(conn: &mut Connection, path: &str) -> Result<usize> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut count = 0;
    for (i, result) in rdr.records().enumerate() {
        let rec = result?;
        let line = i + 2;
        let kind = rec.get(0).context("kind missing")?.trim();
        let name = rec.get(1).context("name missing")?.trim().to_string();
        let amount_raw = rec.get(2).context("amount missing")?.trim();
        let date_raw = rec.get(3).context("date missing")?.trim();
        let every = rec.get(4).map(str::trim).filter(|s| !s.is_empty()).unwrap_or("none");
        let interval_raw = rec.get(5).map(str::trim).filter(|s| !s.is_empty()).unwrap_or("1");
        let category = rec
            .get(6)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("general")
            .to_string();
        let settled_raw = rec.get(8).map(str::trim).unwrap_or("");

        let direction: Direction = kind
            .parse()
            .with_context(|| format!("Line {}: invalid kind '{}'", line, kind))?;
        let amount = parse_decimal(amount_raw)
            .with_context(|| format!("Line {}: invalid amount '{}' for {}", line, amount_raw, name))?;
        let occurs_on = parse_date(date_raw)
            .with_context(|| format!("Line {}: invalid date '{}'", line, date_raw))?;
        let interval: u32 = interval_raw
            .parse()
            .with_context(|| format!("Line {}: invalid interval '{}'", line, interval_raw))?;
        let recurrence = RecurrenceRule::parse(every, interval)
            .with_context(|| format!("Line {}: invalid recurrence", line))?;
        let settled = parse_settled(settled_raw)
            .with_context(|| format!("Line {}: invalid settled flag '{}'", line, settled_raw))?;

        let item = LedgerItem {
            id: 0,
            name,
            amount,
            occurs_on,
            direction,
            recurrence,
            category,
            settled,
        };
        insert_item(&tx, &item).with_context(|| format!("Line {}", line))?;
        count += 1;
    }
    tx.commit()?;
    info!(count, path, "ledger import finished");
    Ok(count)
}

fn parse_settled(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "yes" => Ok(true),
        other => Err(anyhow!("expected true/false, got '{}'", other)),
    }
}
