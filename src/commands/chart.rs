// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{Aggregate, Bucketing, SeriesRequest, Window, aggregate};
use crate::config::Config;
use crate::state::LedgerState;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

pub fn request(m: &clap::ArgMatches) -> Result<SeriesRequest> {
    let window = m
        .get_one::<String>("window")
        .map(|w| w.parse::<Window>())
        .transpose()?
        .unwrap_or(Window::Days(30));
    let bucketing = m
        .get_one::<String>("by")
        .map(|b| b.parse::<Bucketing>())
        .transpose()?
        .unwrap_or(Bucketing::Day);
    Ok(SeriesRequest { window, bucketing })
}

pub fn series<Tz>(state: &LedgerState, m: &clap::ArgMatches, now: &DateTime<Tz>) -> Result<Aggregate>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let req = request(m)?;
    Ok(aggregate(&state.transactions, req, state.balance, now))
}

pub fn handle(state: &LedgerState, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    let agg = series(state, m, &Local::now())?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &agg.series)? {
        return Ok(());
    }
    let rows = agg
        .series
        .iter()
        .map(|p| {
            vec![
                p.key.clone(),
                fmt_money(&p.balance, &cfg.currency),
                p.transaction_count.to_string(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Bucket", "Balance", "Txns"], rows));
    if !agg.drift.is_zero() {
        println!(
            "Note: ledger and server balance differ by {}; all-time and windowed views will disagree",
            fmt_money(&agg.drift, &cfg.currency)
        );
    }
    Ok(())
}
