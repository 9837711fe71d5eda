// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::engine::recurrence::{RecurrenceRule, project_occurrences};
use crate::models::{Direction, LedgerItem};
use crate::utils::{
    date_column, decimal_column, fmt_money, json_flags, maybe_print_json, parse_date,
    parse_decimal, pretty_table,
};
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::{debug, info};

pub fn handle(conn: &Connection, settings: &Settings, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, settings, sub)?,
        Some(("list", sub)) => list(conn, settings, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(sub)?;
            let n = conn.execute("DELETE FROM ledger_items WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(anyhow!("Ledger item {} not found", id));
            }
            println!("Removed ledger item {}", id);
        }
        Some(("settle", sub)) => {
            let id = parse_id(sub)?;
            let n = conn.execute("UPDATE ledger_items SET settled=1 WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(anyhow!("Ledger item {} not found", id));
            }
            println!("Marked ledger item {} as settled", id);
        }
        Some(("preview", sub)) => preview(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_id(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("id").unwrap();
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", raw.trim()))
}

/// Parse `--every`/`--interval` into an optional rule.
pub fn rule_from_args(sub: &clap::ArgMatches) -> Result<Option<RecurrenceRule>> {
    let every = sub.get_one::<String>("every").map(|s| s.as_str()).unwrap_or("none");
    let interval = sub.get_one::<u32>("interval").copied().unwrap_or(1);
    Ok(RecurrenceRule::parse(every, interval)?)
}

fn add(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let direction: Direction = sub.get_one::<String>("kind").unwrap().parse()?;
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    if name.is_empty() {
        return Err(anyhow!("Ledger item name must not be empty"));
    }
    let amount = LedgerItem::validate_amount(parse_decimal(sub.get_one::<String>("amount").unwrap())?)?;
    let occurs_on = parse_date(sub.get_one::<String>("date").unwrap())?;
    let category = sub
        .get_one::<String>("category")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or("general")
        .to_string();
    let recurrence = rule_from_args(sub)?;

    let item = LedgerItem {
        id: 0,
        name,
        amount,
        occurs_on,
        direction,
        recurrence,
        category,
        settled: false,
    };
    let id = insert_item(conn, &item)?;
    let schedule = match item.recurrence {
        Some(r) => format!(", repeats {}", r),
        None => String::new(),
    };
    println!(
        "Added {} #{} '{}' {} on {}{}",
        item.direction,
        id,
        item.name,
        fmt_money(&item.amount, &settings.currency),
        item.occurs_on,
        schedule
    );
    Ok(())
}

/// Insert a new item; its `id` field is ignored.
pub fn insert_item(conn: &Connection, item: &LedgerItem) -> Result<i64> {
    LedgerItem::validate_amount(item.amount)?;
    let (frequency, interval) = match item.recurrence {
        Some(r) => (Some(r.frequency().as_str()), r.interval()),
        None => (None, 1),
    };
    conn.execute(
        "INSERT INTO ledger_items(name, direction, amount, occurs_on, frequency, interval, category, settled)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            item.name,
            item.direction.as_str(),
            item.amount.to_string(),
            item.occurs_on.to_string(),
            frequency,
            interval,
            item.category,
            item.settled
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, name = %item.name, direction = %item.direction, "ledger item added");
    Ok(id)
}

pub fn load_items(conn: &Connection) -> Result<Vec<LedgerItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, direction, amount, occurs_on, frequency, interval, category, settled
         FROM ledger_items ORDER BY occurs_on, id",
    )?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let name: String = r.get(1)?;
        let direction: String = r.get(2)?;
        let amount: String = r.get(3)?;
        let occurs_on: String = r.get(4)?;
        let frequency: Option<String> = r.get(5)?;
        let interval: u32 = r.get(6)?;
        let category: String = r.get(7)?;
        let settled: bool = r.get(8)?;
        let recurrence = RecurrenceRule::parse(frequency.as_deref().unwrap_or("none"), interval)
            .with_context(|| format!("Invalid recurrence stored for ledger item {}", id))?;
        items.push(LedgerItem {
            id,
            name,
            amount: decimal_column(&amount, "ledger amount")?,
            occurs_on: date_column(&occurs_on, "ledger date")?,
            direction: direction
                .parse()
                .with_context(|| format!("Invalid direction stored for ledger item {}", id))?,
            recurrence,
            category,
            settled,
        });
    }
    debug!(count = items.len(), "loaded ledger items");
    Ok(items)
}

#[derive(Serialize)]
pub struct LedgerRow {
    pub id: i64,
    pub kind: String,
    pub name: String,
    pub amount: String,
    pub date: String,
    pub repeats: String,
    pub category: String,
    pub settled: bool,
}

impl From<&LedgerItem> for LedgerRow {
    fn from(i: &LedgerItem) -> Self {
        Self {
            id: i.id,
            kind: i.direction.to_string(),
            name: i.name.clone(),
            amount: format!("{:.2}", i.amount),
            date: i.occurs_on.to_string(),
            repeats: i.recurrence.map(|r| r.to_string()).unwrap_or_else(|| "none".into()),
            category: i.category.clone(),
            settled: i.settled,
        }
    }
}

fn list(conn: &Connection, settings: &Settings, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let kind = sub.get_one::<String>("kind");
    let data: Vec<LedgerRow> = load_items(conn)?
        .iter()
        .filter(|i| kind.is_none_or(|k| i.direction.as_str() == k.as_str()))
        .map(LedgerRow::from)
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.kind,
                    r.name,
                    format!("{} {}", settings.currency, r.amount),
                    r.date,
                    r.repeats,
                    r.category,
                    if r.settled { "yes".into() } else { "".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Kind", "Name", "Amount", "Date", "Repeats", "Category", "Settled"],
                rows
            )
        );
    }
    Ok(())
}

fn preview(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let count = *sub.get_one::<usize>("count").unwrap();
    let (start, rule) = if sub.contains_id("id") {
        let id = parse_id(sub)?;
        let item = load_items(conn)?
            .into_iter()
            .find(|i| i.id == id)
            .ok_or_else(|| anyhow!("Ledger item {} not found", id))?;
        (item.occurs_on, item.recurrence)
    } else {
        let date = sub
            .get_one::<String>("date")
            .ok_or_else(|| anyhow!("Provide --id or --date"))?;
        (parse_date(date)?, rule_from_args(sub)?)
    };
    let dates = project_occurrences(start, rule.as_ref(), count)?;
    let data: Vec<String> = dates.iter().map(|d| d.to_string()).collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        if rule.is_none() {
            println!("Does not repeat: {}", data.join(", "));
        } else {
            println!("Next {} occurrences: {}", data.len(), data.join(", "));
        }
    }
    Ok(())
}
