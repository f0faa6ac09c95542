// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::{HttpApi, LedgerApi};
use crate::config::Config;
use crate::session::{self, Session};
use crate::utils::required;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use rusqlite::Connection;
use tracing::warn;

pub fn login(conn: &Connection, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    let email = required(m, "email")?;
    let password = required(m, "password")?;
    let api = HttpApi::new(&cfg.api_url, cfg.timeout(), None).context("Build HTTP client")?;
    let s = sign_in(conn, api, email, password, &Local::now())?;
    println!(
        "Signed in as {} <{}>; {} transactions cached",
        s.user().name,
        s.user().email,
        s.state().transactions.len()
    );
    Ok(())
}

/// Stores the session, loads the user's daily totals and primes the cache.
pub fn sign_in<'c, A: LedgerApi, Tz: TimeZone>(
    conn: &'c Connection,
    api: A,
    email: &str,
    password: &str,
    now: &DateTime<Tz>,
) -> Result<Session<'c, A>> {
    let user = session::login(conn, &api, email, password)?;
    let mut s = Session::start(conn, api, user, now);
    if let Err(e) = s.refresh(now) {
        warn!(error = %e, "initial sync failed");
    }
    Ok(s)
}

pub fn logout<A: LedgerApi>(s: Session<'_, A>) -> Result<()> {
    let email = s.user().email.clone();
    s.logout()?;
    println!("Signed out {}", email);
    Ok(())
}
