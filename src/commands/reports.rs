// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{LedgerFigures, category_breakdown, monthly_breakdown};
use crate::api::{AnalyticsKind, LedgerApi};
use crate::commands::risk::{assess, assess_daily};
use crate::config::Config;
use crate::models::DailyTotals;
use crate::risk::{DailyStopLoss, RiskAssessment};
use crate::session::Session;
use crate::state::LedgerState;
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(state: &LedgerState, daily: &DailyTotals, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => {
            let r = summary(state, daily, Utc::now());
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r)? {
                let rows = summary_pairs(&r, &cfg.currency)
                    .into_iter()
                    .map(|(k, v)| vec![k.to_string(), v])
                    .collect();
                println!("{}", pretty_table(&["Summary", "Value"], rows));
            }
        }
        Some(("monthly", sub)) => {
            let data = monthly_breakdown(&state.transactions);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let ccy = &cfg.currency;
                let rows = data
                    .iter()
                    .map(|b| {
                        vec![
                            b.key.clone(),
                            fmt_money(&b.totals.deposit, ccy),
                            fmt_money(&b.totals.withdraw, ccy),
                            fmt_money(&b.totals.gains, ccy),
                            fmt_money(&b.totals.losses, ccy),
                            fmt_money(&b.net, ccy),
                            b.count.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Month", "Deposits", "Withdrawals", "Gains", "Losses", "Net", "Txns"],
                        rows
                    )
                );
            }
        }
        Some(("categories", sub)) => {
            let data = category_shares(state);
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.category.clone(),
                            fmt_money(&c.amount, &cfg.currency),
                            fmt_pct(&c.share),
                            c.count.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Category", "Spent", "Share", "Txns"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub generated_at: DateTime<Utc>,
    pub current_balance: Decimal,
    pub transaction_count: usize,
    pub figures: LedgerFigures,
    pub risk: RiskAssessment,
    pub daily_gains: Decimal,
    pub daily_losses: Decimal,
    pub daily_stop_loss: DailyStopLoss,
    pub objectives_open: usize,
}

pub fn analytics_kind(name: &str) -> Result<AnalyticsKind> {
    Ok(match name {
        "overview" => AnalyticsKind::Overview,
        "monthly" => AnalyticsKind::Monthly,
        "performance" => AnalyticsKind::Performance,
        "risk" => AnalyticsKind::Risk,
        other => bail!("Unknown analytics kind '{}'", other),
    })
}

/// The payload shape belongs to the server, so it is passed through untouched.
pub fn analytics<A: LedgerApi>(s: &mut Session<'_, A>, m: &clap::ArgMatches) -> Result<()> {
    let name = m
        .get_one::<String>("kind")
        .map(String::as_str)
        .unwrap_or("overview");
    let v = s.analytics(analytics_kind(name)?)?;
    if m.get_flag("jsonl") {
        println!("{}", serde_json::to_string(&v)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&v)?);
    }
    Ok(())
}

pub fn summary(state: &LedgerState, daily: &DailyTotals, generated_at: DateTime<Utc>) -> SummaryReport {
    SummaryReport {
        generated_at,
        current_balance: state.balance.current,
        transaction_count: state.transactions.len(),
        figures: LedgerFigures::compute(&state.transactions, state.balance),
        risk: assess(state),
        daily_gains: daily.gains,
        daily_losses: daily.losses,
        daily_stop_loss: assess_daily(state, daily),
        objectives_open: state.objectives.iter().filter(|o| !o.is_complete()).count(),
    }
}

/// Flat `(label, value)` view shared by the table and CSV export.
pub fn summary_pairs(r: &SummaryReport, ccy: &str) -> Vec<(&'static str, String)> {
    let f = &r.figures;
    vec![
        ("Generated", r.generated_at.to_rfc3339()),
        ("Current balance", fmt_money(&r.current_balance, ccy)),
        ("Initial bankroll", fmt_money(&f.effective_initial, ccy)),
        ("Overall profit", fmt_money(&f.overall_profit, ccy)),
        ("Deposits", fmt_money(&f.totals.deposit, ccy)),
        ("Withdrawals", fmt_money(&f.totals.withdraw, ccy)),
        ("Gains", fmt_money(&f.totals.gains, ccy)),
        ("Losses", fmt_money(&f.totals.losses, ccy)),
        ("Real profit", fmt_money(&f.real_profit, ccy)),
        ("Operational balance", fmt_money(&f.operational_balance, ccy)),
        ("Transactions", r.transaction_count.to_string()),
        ("Risk tier", r.risk.tier.to_string()),
        ("Stop-loss amount", fmt_money(&r.risk.stop_loss_amount, ccy)),
        ("Loss", fmt_pct(&r.risk.loss_percentage)),
        ("Today's gains", fmt_money(&r.daily_gains, ccy)),
        ("Today's losses", fmt_money(&r.daily_losses, ccy)),
        ("Daily stop-loss used", fmt_pct(&r.daily_stop_loss.progress)),
        ("Open objectives", r.objectives_open.to_string()),
    ]
}

#[derive(Debug, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    pub count: usize,
    /// Percentage of all outflows.
    pub share: Decimal,
}

pub fn category_shares(state: &LedgerState) -> Vec<CategoryShare> {
    let rows = category_breakdown(&state.transactions);
    let total: Decimal = rows.iter().map(|r| r.amount).sum();
    rows.into_iter()
        .map(|r| CategoryShare {
            share: if total.is_zero() {
                Decimal::ZERO
            } else {
                (r.amount / total * Decimal::ONE_HUNDRED).round_dp(1)
            },
            category: r.category,
            amount: r.amount,
            count: r.count,
        })
        .collect()
}
