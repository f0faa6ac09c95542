// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::LedgerFigures;
use crate::config::Config;
use crate::state::LedgerState;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BalanceView {
    pub current: Decimal,
    pub initial: Decimal,
    pub effective_initial: Decimal,
    pub overall_profit: Decimal,
    pub real_profit: Decimal,
    pub operational_balance: Decimal,
    pub last_sync: Option<DateTime<Utc>>,
}

pub fn view(state: &LedgerState) -> BalanceView {
    let f = LedgerFigures::compute(&state.transactions, state.balance);
    BalanceView {
        current: state.balance.current,
        initial: state.balance.initial,
        effective_initial: f.effective_initial,
        overall_profit: f.overall_profit,
        real_profit: f.real_profit,
        operational_balance: f.operational_balance,
        last_sync: state.last_updated,
    }
}

pub fn handle(state: &LedgerState, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    let v = view(state);
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &v)? {
        return Ok(());
    }
    let ccy = &cfg.currency;
    let rows = vec![
        vec!["Current balance".into(), fmt_money(&v.current, ccy)],
        vec!["Initial bankroll".into(), fmt_money(&v.effective_initial, ccy)],
        vec!["Overall profit".into(), fmt_money(&v.overall_profit, ccy)],
        vec!["Real profit (gains - losses)".into(), fmt_money(&v.real_profit, ccy)],
        vec!["Operational balance".into(), fmt_money(&v.operational_balance, ccy)],
        vec![
            "Last sync".into(),
            v.last_sync
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".into()),
        ],
    ];
    println!("{}", pretty_table(&["Balance", "Value"], rows));
    Ok(())
}
