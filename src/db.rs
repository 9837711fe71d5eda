// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Clip", "clip"));

/// Overrides the platform data directory when set.
pub const DB_ENV: &str = "CLIP_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("clip.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    debug!(path = %path.display(), "opening database");
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Open in-memory DB")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS balance_snapshots(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        as_of TEXT NOT NULL,
        balance TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_balance_as_of ON balance_snapshots(as_of);

    CREATE TABLE IF NOT EXISTS ledger_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        direction TEXT NOT NULL CHECK(direction IN ('income','expense')),
        amount TEXT NOT NULL,
        occurs_on TEXT NOT NULL,
        frequency TEXT,
        interval INTEGER NOT NULL DEFAULT 1 CHECK(interval >= 1),
        category TEXT NOT NULL DEFAULT 'general',
        settled INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_ledger_occurs_on ON ledger_items(occurs_on);

    -- one immutable record per calendar day
    CREATE TABLE IF NOT EXISTS performance(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL UNIQUE,
        target TEXT NOT NULL,
        spent TEXT NOT NULL,
        saved TEXT NOT NULL,
        score INTEGER NOT NULL CHECK(score BETWEEN 0 AND 100),
        category TEXT NOT NULL,
        xp_gained INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS streak_state(
        id INTEGER PRIMARY KEY CHECK(id = 1),
        current_streak INTEGER NOT NULL,
        longest_streak INTEGER NOT NULL,
        last_active_date TEXT,
        last_record_date TEXT,
        streak_start_date TEXT,
        total_days INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS achievements_unlocked(
        code TEXT PRIMARY KEY,
        unlocked_on TEXT NOT NULL,
        points INTEGER NOT NULL
    );
    "#,
    )?;
    Ok(())
}
