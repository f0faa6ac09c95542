// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::LedgerApi;
use crate::commands::risk::baseline;
use crate::config::Config;
use crate::models::{DailyTotals, RiskProfile};
use crate::risk::{
    Preset, Recommendation, daily_profit_progress, daily_profit_target, recommend,
    stop_loss_amount,
};
use crate::session::Session;
use crate::state::LedgerState;
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle<A: LedgerApi>(s: &mut Session<'_, A>, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(s.state(), s.tracker().totals(), cfg, sub)?,
        Some(("set", sub)) => set(s, cfg, sub)?,
        Some(("recommend", sub)) => {
            let level = sub
                .get_one::<u8>("risk-level")
                .copied()
                .or(s.state().profile.as_ref().map(|p| p.risk_level))
                .unwrap_or(5);
            let r = advice(level, s.state().balance.current, s.tracker().totals());
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r)? {
                print_advice(&r, cfg);
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_preset(s: &str) -> Result<Preset> {
    match s {
        "cautious" => Ok(Preset::Cautious),
        "balanced" => Ok(Preset::Balanced),
        "highrisk" => Ok(Preset::HighRisk),
        other => Err(anyhow!("Unknown preset '{}'", other)),
    }
}

fn preset_level(p: Preset) -> u8 {
    match p {
        Preset::Cautious => 2,
        Preset::Balanced => 5,
        Preset::HighRisk => 8,
    }
}

/// Merges flags onto `existing`. The monetary stop-loss follows the
/// percentage unless given explicitly.
pub fn profile_from_args(
    existing: Option<&RiskProfile>,
    sub: &clap::ArgMatches,
    fallback_initial: Decimal,
) -> Result<RiskProfile> {
    let mut p = existing.cloned().unwrap_or_default();
    let mut rederive = existing.is_none();

    if let Some(name) = sub.get_one::<String>("preset") {
        let preset = parse_preset(name)?;
        p.profile_type = Some(preset.id().to_string());
        p.risk_level = preset_level(preset);
        p.stop_loss_percentage = preset.recommended_stop_loss();
        p.profit_target = preset.recommended_profit_target();
        rederive = true;
    }
    if let Some(level) = sub.get_one::<u8>("risk-level") {
        p.risk_level = *level;
    }
    if let Some(pct) = sub.get_one::<String>("stop-loss-pct") {
        p.stop_loss_percentage = parse_decimal(pct)?;
        rederive = true;
    }
    if let Some(pt) = sub.get_one::<String>("profit-target") {
        p.profit_target = parse_decimal(pt)?;
    }
    if let Some(ib) = sub.get_one::<String>("initial-balance") {
        p.initial_balance = parse_decimal(ib)?;
        rederive = true;
    }
    if p.initial_balance <= Decimal::ZERO {
        p.initial_balance = fallback_initial;
    }
    if p.stop_loss_percentage < Decimal::ZERO || p.stop_loss_percentage >= Decimal::ONE_HUNDRED {
        return Err(anyhow!(
            "Stop-loss percentage must be between 0 and 100, got {}",
            p.stop_loss_percentage
        ));
    }
    match sub.get_one::<String>("stop-loss") {
        Some(sl) => p.stop_loss = parse_decimal(sl)?,
        None if rederive => p.stop_loss = stop_loss_amount(p.initial_balance, p.stop_loss_percentage),
        None => {}
    }
    Ok(p)
}

fn set<A: LedgerApi>(s: &mut Session<'_, A>, cfg: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let fallback = baseline(s.state());
    let draft = profile_from_args(s.state().profile.as_ref(), sub, fallback)?;
    let saved = s.save_profile(&draft, &Local::now())?;
    println!(
        "Saved profile: risk level {}, stop-loss {} ({}), profit target {}",
        saved.risk_level,
        fmt_pct(&saved.stop_loss_percentage),
        fmt_money(&saved.stop_loss, &cfg.currency),
        fmt_pct(&saved.profit_target)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Advice {
    pub risk_level: u8,
    pub preset: Preset,
    pub preset_title: &'static str,
    pub recommendation: Recommendation,
    pub daily_profit_target: Decimal,
    pub daily_profit_progress: Decimal,
}

pub fn advice(risk_level: u8, current_balance: Decimal, daily: &DailyTotals) -> Advice {
    let preset = Preset::for_risk_level(risk_level);
    let target = daily_profit_target(current_balance, risk_level);
    Advice {
        risk_level,
        preset,
        preset_title: preset.title(),
        recommendation: recommend(risk_level),
        daily_profit_target: target,
        daily_profit_progress: daily_profit_progress(daily.gains, target),
    }
}

fn print_advice(a: &Advice, cfg: &Config) {
    let r = &a.recommendation;
    let rows = vec![
        vec!["Risk level".into(), a.risk_level.to_string()],
        vec!["Profile".into(), a.preset_title.into()],
        vec!["Stop-loss".into(), fmt_pct(&r.stop_loss_percentage)],
        vec!["Profit target".into(), fmt_pct(&r.profit_target_percentage)],
        vec!["Max bet".into(), fmt_pct(&r.max_bet_percentage)],
        vec!["Daily profit target".into(), fmt_money(&a.daily_profit_target, &cfg.currency)],
        vec!["Reached today".into(), fmt_pct(&a.daily_profit_progress)],
    ];
    println!("{}", pretty_table(&["Recommendation", "Value"], rows));
}

#[derive(Serialize)]
struct ProfileView<'a> {
    profile: Option<&'a RiskProfile>,
    advice: Advice,
}

fn show(state: &LedgerState, daily: &DailyTotals, cfg: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let level = state.profile.as_ref().map(|p| p.risk_level).unwrap_or(5);
    let view = ProfileView {
        profile: state.profile.as_ref(),
        advice: advice(level, state.balance.current, daily),
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view)? {
        return Ok(());
    }
    match view.profile {
        Some(p) => {
            let rows = vec![
                vec!["Type".into(), p.profile_type.clone().unwrap_or_else(|| "custom".into())],
                vec!["Risk level".into(), p.risk_level.to_string()],
                vec!["Bankroll".into(), fmt_money(&p.initial_balance, &cfg.currency)],
                vec!["Stop-loss".into(), fmt_pct(&p.stop_loss_percentage)],
                vec!["Stop-loss value".into(), fmt_money(&p.stop_loss, &cfg.currency)],
                vec!["Profit target".into(), fmt_pct(&p.profit_target)],
                vec![
                    "Configured".into(),
                    if p.is_configured() { "yes" } else { "no" }.into(),
                ],
            ];
            println!("{}", pretty_table(&["Profile", "Value"], rows));
        }
        None => println!("No risk profile yet; try `bankroll profile set --preset balanced`"),
    }
    print_advice(&view.advice, cfg);
    Ok(())
}
