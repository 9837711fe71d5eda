// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::allowance::PeriodMode;
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};

pub const PERIOD_MODE: &str = "period_mode";
pub const CURRENCY: &str = "currency";
pub const KEYS: [&str; 2] = [PERIOD_MODE, CURRENCY];

/// User preferences, loaded once per invocation and passed to the commands
/// that need them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub period_mode: PeriodMode,
    pub currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            period_mode: PeriodMode::default(),
            currency: "USD".to_string(),
        }
    }
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut s = Self::default();
        if let Some(v) = get_setting(conn, PERIOD_MODE)? {
            s.period_mode = v
                .parse()
                .with_context(|| format!("Invalid stored {} '{}'", PERIOD_MODE, v))?;
        }
        if let Some(v) = get_setting(conn, CURRENCY)? {
            s.currency = v;
        }
        Ok(s)
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

/// Validate and store a setting. Returns the normalized value.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    let normalized = match key {
        PERIOD_MODE => value.parse::<PeriodMode>()?.to_string(),
        CURRENCY => {
            if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(anyhow!("Invalid currency code '{}'", value));
            }
            value.to_uppercase()
        }
        other => {
            return Err(anyhow!(
                "Unknown setting '{}' (known: {})",
                other,
                KEYS.join(", ")
            ));
        }
    };
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, normalized],
    )?;
    Ok(normalized)
}
