// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use clip::{cli, commands, config::Settings, db};

fn init_logging() {
    let filter = EnvFilter::try_from_env("CLIP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;
    let settings = Settings::load(&conn)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        Some(("balance", sub)) => commands::balance::handle(&conn, &settings, sub)?,
        Some(("ledger", sub)) => commands::ledger::handle(&conn, &settings, sub)?,
        Some(("today", sub)) => commands::clip::handle_today(&conn, &settings, sub)?,
        Some(("scenario", sub)) => commands::clip::handle_scenario(&conn, &settings, sub)?,
        Some(("timeline", sub)) => commands::clip::handle_timeline(&conn, &settings, sub)?,
        Some(("perf", sub)) => commands::performance::handle(&mut conn, &settings, sub)?,
        Some(("streak", sub)) => commands::performance::handle_streak(&conn, sub)?,
        Some(("achievements", sub)) => commands::achievements::handle(&conn, sub)?,
        Some(("import", sub)) => commands::importer::handle(&mut conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
