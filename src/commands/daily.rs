// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::LedgerApi;
use crate::commands::risk::assess_daily;
use crate::config::Config;
use crate::daily::{DailyStore, ResetState, ResetTimer, ResetTracker, Rollover};
use crate::db;
use crate::models::DailyTotals;
use crate::risk::{DailyStopLoss, daily_profit_progress, daily_profit_target};
use crate::session::Session;
use crate::state::LedgerState;
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, pretty_table};
use anyhow::{Result, anyhow};
use chrono::{DateTime, Local, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

pub fn handle<A: LedgerApi>(s: &mut Session<'_, A>, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("status", sub)) => {
            let now = Local::now();
            let st = status(s.state(), s.tracker().totals(), s.tracker().history().len(), &now);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &st)? {
                print_status(&st, cfg);
            }
        }
        Some(("check", _)) => match s.tracker_mut().check(&Local::now()) {
            Some(r) => print_rollover(&r, cfg),
            None => println!("Daily totals are current"),
        },
        Some(("watch", sub)) => {
            let interval = sub
                .get_one::<u64>("interval")
                .map(|n| Duration::from_secs(*n))
                .unwrap_or_else(|| cfg.reset_check_interval());
            let ticks = sub.get_one::<u64>("ticks").copied();
            // The timer thread owns its own connection.
            let conn = db::open_or_init()?;
            let tracker = ResetTracker::start(&s.user().id, conn, &Local::now());
            println!(
                "Watching for day rollover every {}s (Ctrl-C to stop)",
                interval.as_secs()
            );
            let tracker = watch(tracker, interval, ticks, Local)?;
            println!(
                "Stopped; today's gains {}, losses {}",
                fmt_money(&tracker.totals().gains, &cfg.currency),
                fmt_money(&tracker.totals().losses, &cfg.currency)
            );
        }
        _ => {}
    }
    Ok(())
}

/// Runs the rollover check every `interval` until `ticks` checks have run
/// (forever when `None`), then stops the timer and hands the tracker back.
pub fn watch<S, Tz>(
    tracker: ResetTracker<S>,
    interval: Duration,
    ticks: Option<u64>,
    tz: Tz,
) -> Result<ResetTracker<S>>
where
    S: DailyStore + Send + 'static,
    Tz: TimeZone + Send + 'static,
{
    let shared = Arc::new(Mutex::new(tracker));
    let (done_tx, done_rx) = mpsc::channel::<Option<Rollover>>();
    let worker = Arc::clone(&shared);
    let mut timer = ResetTimer::spawn(interval, move || {
        let now = Utc::now().with_timezone(&tz);
        let rolled = match worker.lock() {
            Ok(mut t) => t.check(&now),
            Err(_) => None,
        };
        let _ = done_tx.send(rolled);
    })?;

    let mut seen = 0u64;
    while ticks.is_none_or(|n| seen < n) {
        match done_rx.recv() {
            Ok(Some(r)) => {
                seen += 1;
                info!(reset_at = %r.reset_at, "day rolled over");
            }
            Ok(None) => seen += 1,
            Err(_) => break,
        }
    }
    timer.cancel();

    let mutex = Arc::try_unwrap(shared).map_err(|_| anyhow!("reset tracker still shared"))?;
    mutex
        .into_inner()
        .map_err(|_| anyhow!("reset tracker lock poisoned"))
}

#[derive(Debug, Serialize)]
pub struct DailyStatus {
    pub gains: Decimal,
    pub losses: Decimal,
    pub net: Decimal,
    pub last_reset: Option<DateTime<Utc>>,
    pub current: bool,
    pub history_entries: usize,
    pub profit_target: Decimal,
    pub profit_progress: Decimal,
    pub stop_loss: DailyStopLoss,
}

pub fn status<Tz: TimeZone>(
    state: &LedgerState,
    totals: &DailyTotals,
    history_entries: usize,
    now: &DateTime<Tz>,
) -> DailyStatus {
    let level = state.profile.as_ref().map(|p| p.risk_level).unwrap_or(5);
    let target = daily_profit_target(state.balance.current, level);
    DailyStatus {
        gains: totals.gains,
        losses: totals.losses,
        net: totals.gains - totals.losses,
        last_reset: totals.last_reset,
        current: totals.state_at(now) == ResetState::Current,
        history_entries,
        profit_target: target,
        profit_progress: daily_profit_progress(totals.gains, target),
        stop_loss: assess_daily(state, totals),
    }
}

fn print_status(st: &DailyStatus, cfg: &Config) {
    let ccy = &cfg.currency;
    let rows = vec![
        vec!["Gains".into(), fmt_money(&st.gains, ccy)],
        vec!["Losses".into(), fmt_money(&st.losses, ccy)],
        vec!["Net".into(), fmt_money(&st.net, ccy)],
        vec![
            "Last reset".into(),
            st.last_reset
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".into()),
        ],
        vec![
            "State".into(),
            if st.current { "current" } else { "stale" }.into(),
        ],
        vec!["Archived days".into(), st.history_entries.to_string()],
        vec!["Profit target".into(), fmt_money(&st.profit_target, ccy)],
        vec!["Target reached".into(), fmt_pct(&st.profit_progress)],
        vec!["Stop-loss used".into(), fmt_pct(&st.stop_loss.progress)],
    ];
    println!("{}", pretty_table(&["Today", "Value"], rows));
}

fn print_rollover(r: &Rollover, cfg: &Config) {
    match &r.archived {
        Some(e) => println!(
            "New day: archived {} (gains {}, losses {})",
            e.date.with_timezone(&Local).format("%Y-%m-%d"),
            fmt_money(&e.gains, &cfg.currency),
            fmt_money(&e.losses, &cfg.currency)
        ),
        None => println!("Daily totals started at {}", r.reset_at.with_timezone(&Local)),
    }
}
