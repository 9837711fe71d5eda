// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::ledger::{LedgerRow, load_items};
use crate::commands::performance::load_records;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("ledger", sub)) => export_ledger(conn, sub),
        Some(("performance", sub)) => export_performance(conn, sub),
        _ => Ok(()),
    }
}

fn export_ledger(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let items = load_items(conn)?;

    match fmt.as_str() {
        "csv" => {
            // same column order the importer reads
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "kind", "name", "amount", "date", "every", "interval", "category", "id", "settled",
            ])?;
            for i in &items {
                let (every, interval) = match i.recurrence {
                    Some(r) => (r.frequency().as_str().to_string(), r.interval().to_string()),
                    None => ("none".to_string(), "1".to_string()),
                };
                wtr.write_record([
                    i.direction.as_str().to_string(),
                    i.name.clone(),
                    i.amount.to_string(),
                    i.occurs_on.to_string(),
                    every,
                    interval,
                    i.category.clone(),
                    i.id.to_string(),
                    i.settled.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let data: Vec<LedgerRow> = items.iter().map(LedgerRow::from).collect();
            std::fs::write(out, serde_json::to_string_pretty(&data)?)?;
        }
        other => return Err(anyhow!("Unsupported format '{}'", other)),
    }
    info!(count = items.len(), out = %out, "ledger exported");
    println!("Exported {} ledger item(s) to {}", items.len(), out);
    Ok(())
}

fn export_performance(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let records = load_records(conn)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "target", "spent", "saved", "score", "category"])?;
            for r in &records {
                wtr.write_record([
                    r.date.to_string(),
                    r.target_allowance.to_string(),
                    r.actual_spend.to_string(),
                    r.saved_amount.to_string(),
                    r.score.to_string(),
                    r.category.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let data: Vec<_> = records
                .iter()
                .map(|r| {
                    json!({
                        "date": r.date.to_string(),
                        "target": r.target_allowance.to_string(),
                        "spent": r.actual_spend.to_string(),
                        "saved": r.saved_amount.to_string(),
                        "score": r.score,
                        "category": r.category.as_str(),
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&data)?)?;
        }
        other => return Err(anyhow!("Unsupported format '{}'", other)),
    }
    info!(count = records.len(), out = %out, "performance exported");
    println!("Exported {} performance record(s) to {}", records.len(), out);
    Ok(())
}
