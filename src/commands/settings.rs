// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{KEYS, get_setting, set_setting};
use crate::utils::pretty_table;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let keys: Vec<&str> = match sub.get_one::<String>("key") {
                Some(k) if KEYS.contains(&k.as_str()) => vec![k.as_str()],
                Some(k) => return Err(anyhow!("Unknown setting '{}'", k)),
                None => KEYS.to_vec(),
            };
            let mut rows = Vec::new();
            for k in keys {
                let v = get_setting(conn, k)?.unwrap_or_else(|| "(default)".into());
                rows.push(vec![k.to_string(), v]);
            }
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap();
            let stored = set_setting(conn, key, value)?;
            info!(key, value = %stored, "setting changed");
            println!("{} = {}", key, stored);
        }
        _ => {}
    }
    Ok(())
}
