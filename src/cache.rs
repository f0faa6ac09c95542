// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Durable per-user local cache. Last writer on this device wins.

use crate::daily::DailyStore;
use crate::models::{DailyHistoryEntry, DailyTotals};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod keys {
    pub const TRANSACTIONS: &str = "transactions";
    pub const BALANCE: &str = "balance";
    pub const OBJECTIVES: &str = "objectives";
    pub const PROFILE: &str = "risk_profile";
    pub const LAST_SYNC: &str = "last_sync";
    pub const DAILY_GAINS: &str = "daily_gains";
    pub const DAILY_LOSSES: &str = "daily_losses";
    pub const LAST_RESET: &str = "last_reset_date";
}

pub fn get_raw(conn: &Connection, user_id: &str, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value FROM cache WHERE user_id=?1 AND key=?2",
            params![user_id, key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn put_raw(conn: &Connection, user_id: &str, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO cache(user_id, key, value, updated_at) VALUES (?1, ?2, ?3, datetime('now'))
         ON CONFLICT(user_id, key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
        params![user_id, key, value],
    )?;
    Ok(())
}

pub fn get_json<T: DeserializeOwned>(conn: &Connection, user_id: &str, key: &str) -> Result<Option<T>> {
    match get_raw(conn, user_id, key)? {
        Some(s) => {
            let v = serde_json::from_str(&s)
                .with_context(|| format!("Corrupt cache entry '{}' for user {}", key, user_id))?;
            Ok(Some(v))
        }
        None => Ok(None),
    }
}

pub fn put_json<T: Serialize + ?Sized>(conn: &Connection, user_id: &str, key: &str, v: &T) -> Result<()> {
    put_raw(conn, user_id, key, &serde_json::to_string(v)?)
}

/// Drops every cached entry and the daily history for `user_id`.
pub fn clear_user(conn: &Connection, user_id: &str) -> Result<()> {
    conn.execute("DELETE FROM cache WHERE user_id=?1", params![user_id])?;
    conn.execute("DELETE FROM daily_history WHERE user_id=?1", params![user_id])?;
    Ok(())
}

fn parse_decimal_entry(s: &str, key: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid cached decimal '{}' under {}", s, key))
}

impl DailyStore for Connection {
    fn load_totals(&self, user_id: &str) -> Result<Option<DailyTotals>> {
        let gains = get_raw(self, user_id, keys::DAILY_GAINS)?;
        let losses = get_raw(self, user_id, keys::DAILY_LOSSES)?;
        let last = get_raw(self, user_id, keys::LAST_RESET)?;
        if gains.is_none() && losses.is_none() && last.is_none() {
            return Ok(None);
        }
        let last_reset = match last {
            Some(s) => Some(
                DateTime::parse_from_rfc3339(&s)
                    .with_context(|| format!("Invalid cached reset date '{}'", s))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };
        Ok(Some(DailyTotals {
            gains: gains
                .map(|s| parse_decimal_entry(&s, keys::DAILY_GAINS))
                .transpose()?
                .unwrap_or_default(),
            losses: losses
                .map(|s| parse_decimal_entry(&s, keys::DAILY_LOSSES))
                .transpose()?
                .unwrap_or_default(),
            last_reset,
        }))
    }

    fn save_totals(&self, user_id: &str, totals: &DailyTotals) -> Result<()> {
        put_raw(self, user_id, keys::DAILY_GAINS, &totals.gains.to_string())?;
        put_raw(self, user_id, keys::DAILY_LOSSES, &totals.losses.to_string())?;
        if let Some(last) = totals.last_reset {
            put_raw(self, user_id, keys::LAST_RESET, &last.to_rfc3339())?;
        }
        Ok(())
    }

    fn load_history(&self, user_id: &str) -> Result<Vec<DailyHistoryEntry>> {
        let mut stmt = self.prepare(
            "SELECT date, gains, losses FROM daily_history WHERE user_id=?1 ORDER BY id",
        )?;
        let mut rows = stmt.query(params![user_id])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            let d: String = r.get(0)?;
            let g: String = r.get(1)?;
            let l: String = r.get(2)?;
            out.push(DailyHistoryEntry {
                date: DateTime::parse_from_rfc3339(&d)
                    .with_context(|| format!("Invalid history date '{}'", d))?
                    .with_timezone(&Utc),
                gains: parse_decimal_entry(&g, "daily_history.gains")?,
                losses: parse_decimal_entry(&l, "daily_history.losses")?,
            });
        }
        Ok(out)
    }

    fn append_history(&self, user_id: &str, entry: &DailyHistoryEntry, cap: usize) -> Result<()> {
        self.execute(
            "INSERT INTO daily_history(user_id, date, gains, losses) VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id,
                entry.date.to_rfc3339(),
                entry.gains.to_string(),
                entry.losses.to_string()
            ],
        )?;
        // Keep only the newest `cap` rows for this user.
        self.execute(
            "DELETE FROM daily_history WHERE user_id=?1 AND id NOT IN (
                SELECT id FROM daily_history WHERE user_id=?1 ORDER BY id DESC LIMIT ?2
             )",
            params![user_id, cap as i64],
        )?;
        Ok(())
    }
}
