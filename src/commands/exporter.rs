// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::reports::{summary, summary_pairs};
use crate::config::Config;
use crate::models::{DailyTotals, Transaction};
use crate::state::LedgerState;
use crate::utils::required;
use anyhow::{Result, anyhow};
use chrono::Utc;
use serde_json::json;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

fn format_of(sub: &clap::ArgMatches) -> Result<Format> {
    let fmt = required(sub, "format")?.to_lowercase();
    match fmt.as_str() {
        "csv" => Ok(Format::Csv),
        "json" => Ok(Format::Json),
        other => Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
}

pub fn handle(state: &LedgerState, daily: &DailyTotals, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(state, sub),
        Some(("summary", sub)) => export_summary(state, daily, cfg, sub),
        _ => Ok(()),
    }
}

fn day(t: &Transaction) -> String {
    t.date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Oldest first, one row per transaction.
pub fn export_transactions(state: &LedgerState, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = format_of(sub)?;
    let out = required(sub, "out")?;

    let mut txs: Vec<&Transaction> = state.transactions.iter().collect();
    txs.sort_by_key(|t| t.timeline_at());

    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id", "date", "type", "amount", "category", "description", "is_initial_bank",
            ])?;
            for t in &txs {
                wtr.write_record([
                    t.id.clone(),
                    day(t),
                    t.r#type.to_string(),
                    t.amount.to_string(),
                    t.category.clone().unwrap_or_default(),
                    t.description.clone().unwrap_or_default(),
                    t.is_initial_bank.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            let items: Vec<_> = txs
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id, "date": day(t), "type": t.r#type, "amount": t.amount.to_string(),
                        "category": t.category, "description": t.description,
                        "is_initial_bank": t.is_initial_bank
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported {} transactions to {}", txs.len(), out);
    Ok(())
}

pub fn export_summary(
    state: &LedgerState,
    daily: &DailyTotals,
    cfg: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let fmt = format_of(sub)?;
    let out = required(sub, "out")?;
    let report = summary(state, daily, Utc::now());

    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["field", "value"])?;
            for (k, v) in summary_pairs(&report, &cfg.currency) {
                wtr.write_record([k.to_string(), v])?;
            }
            wtr.flush()?;
        }
        Format::Json => std::fs::write(out, serde_json::to_string_pretty(&report)?)?,
    }
    println!("Exported summary to {}", out);
    Ok(())
}
