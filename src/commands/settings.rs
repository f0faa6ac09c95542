// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, Config, EDITABLE};
use crate::db;
use crate::utils::{maybe_print_json, pretty_table, required};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Serialize)]
struct ConfigView<'a> {
    #[serde(flatten)]
    config: &'a Config,
    database: String,
    signed_in_as: Option<String>,
}

pub fn handle(conn: &Connection, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let view = ConfigView {
                config: cfg,
                database: db::db_path()?.display().to_string(),
                signed_in_as: config::session_user(conn)?.map(|u| u.email),
            };
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
                let rows = vec![
                    vec!["api_url".into(), cfg.api_url.clone()],
                    vec!["currency".into(), cfg.currency.clone()],
                    vec!["timeout_secs".into(), cfg.timeout_secs.to_string()],
                    vec!["reset_check_secs".into(), cfg.reset_check_secs.to_string()],
                    vec!["log_level".into(), cfg.log_level.clone()],
                    vec!["log_format".into(), cfg.log_format.clone()],
                    vec!["database".into(), view.database.clone()],
                    vec![
                        "signed in as".into(),
                        view.signed_in_as.clone().unwrap_or_else(|| "-".into()),
                    ],
                ];
                println!("{}", pretty_table(&["Setting", "Value"], rows));
            }
        }
        Some(("set", sub)) => {
            let key = required(sub, "key")?;
            let value = required(sub, "value")?;
            set(conn, key, value)?;
            println!("{} = {}", key, value.trim());
        }
        _ => {}
    }
    Ok(())
}

/// Validates against [`Config::apply`] before storing.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if !EDITABLE.contains(&key) {
        return Err(anyhow!(
            "Unknown setting '{}', expected one of: {}",
            key,
            EDITABLE.join(", ")
        ));
    }
    let mut candidate = Config::load(conn)?;
    candidate.apply(key, value)?;
    config::set_setting(conn, key, value.trim())
}
