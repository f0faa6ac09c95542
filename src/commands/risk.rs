// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::LedgerFigures;
use crate::config::Config;
use crate::models::DailyTotals;
use crate::risk::{DailyStopLoss, RiskAssessment, evaluate, evaluate_daily, stop_loss_amount};
use crate::state::LedgerState;
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;

/// Profile bankroll when set, otherwise the ledger's effective initial balance.
pub fn baseline(state: &LedgerState) -> Decimal {
    match &state.profile {
        Some(p) if p.initial_balance > Decimal::ZERO => p.initial_balance,
        _ => LedgerFigures::compute(&state.transactions, state.balance).effective_initial,
    }
}

pub fn assess(state: &LedgerState) -> RiskAssessment {
    let pct = state
        .profile
        .as_ref()
        .map(|p| p.stop_loss_percentage)
        .unwrap_or_default();
    evaluate(baseline(state), state.balance.current, pct)
}

/// Monetary stop-loss from the profile, derived from the percentage when unset.
pub fn daily_limit(state: &LedgerState) -> Decimal {
    match &state.profile {
        Some(p) if p.stop_loss > Decimal::ZERO => p.stop_loss,
        Some(p) => stop_loss_amount(baseline(state), p.stop_loss_percentage),
        None => Decimal::ZERO,
    }
}

pub fn assess_daily(state: &LedgerState, daily: &DailyTotals) -> DailyStopLoss {
    evaluate_daily(daily.losses, daily_limit(state))
}

pub fn handle(state: &LedgerState, daily: &DailyTotals, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    let json = m.get_flag("json");
    let jsonl = m.get_flag("jsonl");
    let ccy = &cfg.currency;

    if m.get_flag("daily") {
        let d = assess_daily(state, daily);
        if maybe_print_json(json, jsonl, &d)? {
            return Ok(());
        }
        let rows = vec![
            vec!["Today's losses".into(), fmt_money(&d.losses, ccy)],
            vec!["Daily stop-loss".into(), fmt_money(&d.limit, ccy)],
            vec!["Remaining".into(), fmt_money(&d.remaining, ccy)],
            vec!["Used".into(), fmt_pct(&d.progress)],
        ];
        println!("{}", pretty_table(&["Daily stop-loss", "Value"], rows));
        if d.triggered {
            println!("STOP LOSS HIT: stop betting for today");
        } else if d.near_limit {
            println!("Near the daily limit: less than 20% headroom left");
        } else {
            println!("{}: {}", d.tier.headline(), d.tier.advice());
        }
        return Ok(());
    }

    let a = assess(state);
    if maybe_print_json(json, jsonl, &a)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Tier".into(), a.tier.to_string()],
        vec!["Stop-loss".into(), fmt_pct(&a.stop_loss_percentage)],
        vec!["Stop-loss amount".into(), fmt_money(&a.stop_loss_amount, ccy)],
        vec!["Current loss".into(), fmt_money(&a.current_loss, ccy)],
        vec!["Loss".into(), fmt_pct(&a.loss_percentage)],
        vec!["Limit used".into(), fmt_pct(&a.progress)],
    ];
    println!("{}", pretty_table(&["Risk", "Value"], rows));
    println!("{}: {}", a.tier.headline(), a.tier.advice());
    Ok(())
}
