// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::HttpApi;
use crate::config::{self, Config};
use crate::session::Session;
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use rusqlite::Connection;
use tracing::warn;

pub mod auth;
pub mod balance;
pub mod calendar;
pub mod chart;
pub mod daily;
pub mod exporter;
pub mod objectives;
pub mod profile;
pub mod reports;
pub mod risk;
pub mod settings;
pub mod sync;
pub mod transactions;

/// Session for the stored user. With `refresh`, the cached view is
/// refreshed from the server first; a failed refresh keeps the cache.
pub fn open_session<'c>(conn: &'c Connection, cfg: &Config, refresh: bool) -> Result<Session<'c, HttpApi>> {
    let user = config::session_user(conn)?
        .ok_or_else(|| anyhow!("Not signed in; run `bankroll login` first"))?;
    let token = config::session_token(conn)?;
    let signed_in = token.is_some();
    let api = HttpApi::new(&cfg.api_url, cfg.timeout(), token).context("Build HTTP client")?;
    let now = Local::now();
    if refresh && signed_in {
        return Ok(Session::open(conn, api, user, &now));
    }
    if refresh {
        warn!("session token missing, showing cached data; run `bankroll login`");
    }
    Ok(Session::start(conn, api, user, &now))
}

/// Surfaces a refresh failure without aborting a read-only command.
pub fn report_stale(err: Option<&String>) {
    if let Some(e) = err {
        eprintln!("Warning: showing cached data ({})", e);
    }
}
