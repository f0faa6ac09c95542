// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::User;
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://gerenciamento.sortehub.online/";
pub const DEFAULT_CURRENCY: &str = "BRL";

pub mod settings_keys {
    pub const API_URL: &str = "api_url";
    pub const CURRENCY: &str = "currency";
    pub const TIMEOUT_SECS: &str = "timeout_secs";
    pub const RESET_CHECK_SECS: &str = "reset_check_secs";
    pub const LOG_LEVEL: &str = "log_level";
    pub const LOG_FORMAT: &str = "log_format";
    pub const SESSION_TOKEN: &str = "session_token";
    pub const SESSION_USER: &str = "session_user";
}

/// Keys `config set` accepts.
pub const EDITABLE: [&str; 6] = [
    settings_keys::API_URL,
    settings_keys::CURRENCY,
    settings_keys::TIMEOUT_SECS,
    settings_keys::RESET_CHECK_SECS,
    settings_keys::LOG_LEVEL,
    settings_keys::LOG_FORMAT,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub api_url: String,
    pub currency: String,
    pub timeout_secs: u64,
    pub reset_check_secs: u64,
    pub log_level: String,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            timeout_secs: 15,
            reset_check_secs: 60,
            log_level: "warn".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the settings table, then `BANKROLL_*` environment variables.
    pub fn load(conn: &Connection) -> Result<Config> {
        let mut cfg = Config::default();
        for key in EDITABLE {
            if let Some(v) = get_setting(conn, key)? {
                cfg.apply(key, &v)?;
            }
        }
        for (key, var) in [
            (settings_keys::API_URL, "BANKROLL_API_URL"),
            (settings_keys::TIMEOUT_SECS, "BANKROLL_TIMEOUT_SECS"),
            (settings_keys::RESET_CHECK_SECS, "BANKROLL_RESET_CHECK_SECS"),
            (settings_keys::LOG_LEVEL, "BANKROLL_LOG"),
            (settings_keys::LOG_FORMAT, "BANKROLL_LOG_FORMAT"),
        ] {
            if let Ok(v) = std::env::var(var) {
                cfg.apply(key, &v)
                    .with_context(|| format!("Invalid value in ${}", var))?;
            }
        }
        Ok(cfg)
    }

    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            settings_keys::API_URL => self.api_url = value.to_string(),
            settings_keys::CURRENCY => self.currency = value.to_uppercase(),
            settings_keys::TIMEOUT_SECS => self.timeout_secs = parse_secs(value)?,
            settings_keys::RESET_CHECK_SECS => self.reset_check_secs = parse_secs(value)?,
            settings_keys::LOG_LEVEL => self.log_level = value.to_string(),
            settings_keys::LOG_FORMAT => match value {
                "pretty" | "json" => self.log_format = value.to_string(),
                other => return Err(anyhow!("Invalid log format '{}', expected pretty|json", other)),
            },
            other => return Err(anyhow!("Unknown setting '{}'", other)),
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn reset_check_interval(&self) -> Duration {
        Duration::from_secs(self.reset_check_secs)
    }
}

fn parse_secs(s: &str) -> Result<u64> {
    match s.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(anyhow!("Invalid duration '{}', expected a positive number of seconds", s)),
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn delete_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![key])?;
    Ok(())
}

pub fn session_token(conn: &Connection) -> Result<Option<String>> {
    get_setting(conn, settings_keys::SESSION_TOKEN)
}

pub fn clear_token(conn: &Connection) -> Result<()> {
    delete_setting(conn, settings_keys::SESSION_TOKEN)
}

pub fn session_user(conn: &Connection) -> Result<Option<User>> {
    match get_setting(conn, settings_keys::SESSION_USER)? {
        Some(s) => Ok(Some(
            serde_json::from_str(&s).context("Corrupt stored session user")?,
        )),
        None => Ok(None),
    }
}

pub fn store_session(conn: &Connection, token: &str, user: &User) -> Result<()> {
    set_setting(conn, settings_keys::SESSION_TOKEN, token)?;
    set_setting(conn, settings_keys::SESSION_USER, &serde_json::to_string(user)?)?;
    Ok(())
}

pub fn clear_session(conn: &Connection) -> Result<()> {
    clear_token(conn)?;
    delete_setting(conn, settings_keys::SESSION_USER)
}
