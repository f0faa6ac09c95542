// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use bankroll::config::Config;
use bankroll::{cli, commands, db, logging};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;
    let cfg = Config::load(&conn)?;
    logging::init(&cfg.log_level, &cfg.log_format);

    match matches.subcommand() {
        Some(("login", sub)) => commands::auth::login(&conn, &cfg, sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, &cfg, sub)?,
        Some(("logout", _)) => commands::auth::logout(commands::open_session(&conn, &cfg, false)?)?,
        Some(("sync", sub)) => {
            let mut s = commands::open_session(&conn, &cfg, false)?;
            commands::sync::handle(&mut s, &cfg, sub)?;
        }
        Some(("tx", sub)) => {
            // Writes refetch on their own; listing shows the freshest view.
            let refresh = matches!(sub.subcommand_name(), Some("list"));
            let mut s = commands::open_session(&conn, &cfg, refresh)?;
            commands::transactions::handle(&mut s, sub)?;
        }
        Some(("objective", sub)) => {
            let mut s = commands::open_session(&conn, &cfg, false)?;
            commands::objectives::handle(&mut s, &cfg, sub)?;
        }
        Some(("profile", sub)) => {
            let mut s = commands::open_session(&conn, &cfg, true)?;
            commands::report_stale(s.state().error.as_ref());
            commands::profile::handle(&mut s, &cfg, sub)?;
        }
        Some(("report", sub)) if sub.subcommand_name() == Some("analytics") => {
            let mut s = commands::open_session(&conn, &cfg, false)?;
            if let Some(("analytics", a)) = sub.subcommand() {
                commands::reports::analytics(&mut s, a)?;
            }
        }
        Some(("daily", sub)) => {
            let mut s = commands::open_session(&conn, &cfg, false)?;
            commands::daily::handle(&mut s, &cfg, sub)?;
        }
        Some((name, sub)) => {
            let s = commands::open_session(&conn, &cfg, true)?;
            commands::report_stale(s.state().error.as_ref());
            let state = s.state();
            let daily = s.tracker().totals();
            match name {
                "balance" => commands::balance::handle(state, &cfg, sub)?,
                "chart" => commands::chart::handle(state, &cfg, sub)?,
                "calendar" => commands::calendar::handle(state, &cfg, sub)?,
                "risk" => commands::risk::handle(state, daily, &cfg, sub)?,
                "report" => commands::reports::handle(state, daily, &cfg, sub)?,
                "export" => commands::exporter::handle(state, daily, &cfg, sub)?,
                _ => {
                    cli::build_cli().print_help()?;
                    println!();
                }
            }
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
