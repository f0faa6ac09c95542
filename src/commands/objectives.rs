// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::LedgerApi;
use crate::config::Config;
use crate::models::{Objective, ObjectiveDraft};
use crate::session::Session;
use crate::state::LedgerState;
use crate::utils::{
    fmt_money, fmt_pct, maybe_print_json, parse_date, parse_decimal, pretty_table, required,
};
use anyhow::{Result, anyhow};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle<A: LedgerApi>(s: &mut Session<'_, A>, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(s.state(), cfg, sub)?,
        Some(("add", sub)) => {
            let draft = draft_from_args(sub, None)?;
            let o = s.add_objective(&draft, &Local::now())?;
            println!("Created objective '{}' (id {})", o.title, o.id);
        }
        Some(("update", sub)) => {
            let id = required(sub, "id")?;
            let base = s
                .state()
                .objectives
                .iter()
                .find(|o| &o.id == id)
                .cloned()
                .ok_or_else(|| anyhow!("Objective '{}' not found; try `bankroll sync`", id))?;
            let draft = draft_from_args(sub, Some(&base))?;
            let o = s.update_objective(id, &draft, &Local::now())?;
            println!("Updated objective '{}' ({} done)", o.title, fmt_pct(&o.progress()));
        }
        Some(("delete", sub)) => {
            let id = required(sub, "id")?;
            s.delete_objective(id, &Local::now())?;
            println!("Deleted objective {}", id);
        }
        _ => {}
    }
    Ok(())
}

pub fn draft_from_args(sub: &clap::ArgMatches, base: Option<&Objective>) -> Result<ObjectiveDraft> {
    let title = match sub.get_one::<String>("title") {
        Some(t) => t.trim().to_string(),
        None => base
            .map(|b| b.title.clone())
            .ok_or_else(|| anyhow!("Objective title is required"))?,
    };
    let target_amount = match sub.get_one::<String>("target") {
        Some(t) => parse_decimal(t)?,
        None => base
            .map(|b| b.target_amount)
            .ok_or_else(|| anyhow!("Target amount is required"))?,
    };
    let current_amount = match sub.get_one::<String>("current") {
        Some(c) => parse_decimal(c)?,
        None => base.map(|b| b.current_amount).unwrap_or(Decimal::ZERO),
    };
    let target_date = match sub.get_one::<String>("date") {
        Some(d) => Some(parse_date(d)?),
        None => base.and_then(|b| b.target_date),
    };
    Ok(ObjectiveDraft {
        title,
        target_amount,
        current_amount,
        target_date,
        category: sub
            .get_one::<String>("category")
            .cloned()
            .or_else(|| base.and_then(|b| b.category.clone())),
        description: sub
            .get_one::<String>("description")
            .cloned()
            .or_else(|| base.and_then(|b| b.description.clone())),
    })
}

#[derive(Serialize)]
pub struct ObjectiveRow {
    pub id: String,
    pub title: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub progress: Decimal,
    pub target_date: Option<String>,
    pub complete: bool,
}

/// Incomplete objectives first, then by target date.
pub fn rows(state: &LedgerState) -> Vec<ObjectiveRow> {
    let mut objs: Vec<&Objective> = state.objectives.iter().collect();
    objs.sort_by(|a, b| {
        a.is_complete()
            .cmp(&b.is_complete())
            .then(a.target_date.cmp(&b.target_date))
    });
    objs.into_iter()
        .map(|o| ObjectiveRow {
            id: o.id.clone(),
            title: o.title.clone(),
            target_amount: o.target_amount,
            current_amount: o.current_amount,
            progress: o.progress().round_dp(1),
            target_date: o.target_date.map(|d| d.to_string()),
            complete: o.is_complete(),
        })
        .collect()
}

fn list(state: &LedgerState, cfg: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let data = rows(state);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let table = data
            .iter()
            .map(|r| {
                vec![
                    r.title.clone(),
                    fmt_money(&r.current_amount, &cfg.currency),
                    fmt_money(&r.target_amount, &cfg.currency),
                    fmt_pct(&r.progress),
                    r.target_date.clone().unwrap_or_default(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Objective", "Saved", "Target", "Progress", "By", "Id"], table)
        );
    }
    Ok(())
}
