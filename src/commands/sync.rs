// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::LedgerApi;
use crate::config::Config;
use crate::session::Session;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Serialize)]
pub struct SyncSummary {
    pub transactions: usize,
    pub objectives: usize,
    pub balance: Decimal,
    pub daily_gains: Decimal,
    pub daily_losses: Decimal,
    pub profile: bool,
}

pub fn handle<A: LedgerApi>(s: &mut Session<'_, A>, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    s.refresh(&Local::now())?;
    let st = s.state();
    let totals = s.tracker().totals();
    let out = SyncSummary {
        transactions: st.transactions.len(),
        objectives: st.objectives.len(),
        balance: st.balance.current,
        daily_gains: totals.gains,
        daily_losses: totals.losses,
        profile: st.profile.is_some(),
    };
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &out)? {
        let rows = vec![
            vec!["Transactions".into(), out.transactions.to_string()],
            vec!["Objectives".into(), out.objectives.to_string()],
            vec!["Balance".into(), fmt_money(&out.balance, &cfg.currency)],
            vec!["Today's gains".into(), fmt_money(&out.daily_gains, &cfg.currency)],
            vec!["Today's losses".into(), fmt_money(&out.daily_losses, &cfg.currency)],
            vec![
                "Risk profile".into(),
                if out.profile { "configured" } else { "none" }.into(),
            ],
        ];
        println!("{}", pretty_table(&["Synced", "Value"], rows));
    }
    Ok(())
}
