// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::UNCATEGORIZED;
use crate::api::LedgerApi;
use crate::models::{Transaction, TransactionDraft, TxType};
use crate::session::Session;
use crate::state::LedgerState;
use crate::utils::{
    maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table, required,
};
use anyhow::{Result, anyhow};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

pub fn handle<A: LedgerApi>(s: &mut Session<'_, A>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(s, sub)?,
        Some(("list", sub)) => list(s.state(), sub)?,
        Some(("update", sub)) => update(s, sub)?,
        Some(("delete", sub)) => delete(s, sub)?,
        _ => {}
    }
    Ok(())
}

/// Builds a draft from flags, filling gaps from `base` (when updating) and then defaults.
pub fn draft_from_args(
    sub: &clap::ArgMatches,
    base: Option<&Transaction>,
    today: NaiveDate,
) -> Result<TransactionDraft> {
    let r#type = match sub.get_one::<String>("type") {
        Some(t) => TxType::parse(t).ok_or_else(|| anyhow!("Invalid transaction type '{}'", t))?,
        None => base
            .map(|b| b.r#type)
            .ok_or_else(|| anyhow!("Transaction type is required"))?,
    };
    let amount = match sub.get_one::<String>("amount") {
        Some(a) => parse_decimal(a)?,
        None => base
            .map(|b| b.amount)
            .ok_or_else(|| anyhow!("Amount is required"))?,
    };
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => base
            .and_then(|b| b.date)
            .map(|d| d.date_naive())
            .unwrap_or(today),
    };
    let pick = |key: &str, fallback: Option<&String>| {
        sub.get_one::<String>(key)
            .or(fallback)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    Ok(TransactionDraft {
        r#type,
        amount,
        date,
        category: pick("category", base.and_then(|b| b.category.as_ref())),
        description: pick("description", base.and_then(|b| b.description.as_ref())),
        is_initial_bank: sub.get_flag("initial-bank") || base.is_some_and(|b| b.is_initial_bank),
    })
}

fn add<A: LedgerApi>(s: &mut Session<'_, A>, sub: &clap::ArgMatches) -> Result<()> {
    let now = Local::now();
    let draft = draft_from_args(sub, None, now.date_naive())?;
    let tx = s.add_transaction(&draft, &now)?;
    println!(
        "Recorded {} {} on {} (id {})",
        draft.r#type, draft.amount, draft.date, tx.id
    );
    Ok(())
}

fn update<A: LedgerApi>(s: &mut Session<'_, A>, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let now = Local::now();
    let base = s
        .state()
        .transactions
        .iter()
        .find(|t| &t.id == id)
        .cloned()
        .ok_or_else(|| anyhow!("Transaction '{}' not found; try `bankroll sync`", id))?;
    let draft = draft_from_args(sub, Some(&base), now.date_naive())?;
    s.update_transaction(id, &draft, &now)?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn delete<A: LedgerApi>(s: &mut Session<'_, A>, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    s.delete_transaction(id, &Local::now())?;
    println!("Deleted transaction {}", id);
    Ok(())
}

fn list(state: &LedgerState, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(state, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.r#type.to_string(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Type", "Amount", "Category", "Description", "Id"], rows)
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub r#type: TxType,
    pub amount: String,
    pub category: String,
    pub description: String,
    pub is_initial_bank: bool,
}

/// Newest first. Filters: `--type`, `--category`, `--month` (UTC date), `--limit`.
pub fn query_rows(state: &LedgerState, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let type_filter = match sub.get_one::<String>("type") {
        Some(t) => Some(TxType::parse(t).ok_or_else(|| anyhow!("Invalid transaction type '{}'", t))?),
        None => None,
    };
    let month = sub.get_one::<String>("month").map(|m| parse_month(m)).transpose()?;
    let category = sub.get_one::<String>("category").map(|c| c.to_lowercase());

    let mut txs: Vec<&Transaction> = state
        .transactions
        .iter()
        .filter(|t| type_filter.is_none_or(|ty| t.r#type == ty))
        .filter(|t| match month {
            Some((y, mo)) => t.date.is_some_and(|d| d.year() == y && d.month() == mo),
            None => true,
        })
        .filter(|t| match &category {
            Some(c) => t.category.as_deref().unwrap_or(UNCATEGORIZED).to_lowercase() == *c,
            None => true,
        })
        .collect();
    txs.sort_by(|a, b| b.timeline_at().cmp(&a.timeline_at()));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        txs.truncate(*limit);
    }

    Ok(txs
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id.clone(),
            date: t
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            r#type: t.r#type,
            amount: t.amount.round_dp(2).to_string(),
            category: t.category.clone().unwrap_or_default(),
            description: t.description.clone().unwrap_or_default(),
            is_initial_bank: t.is_initial_bank,
        })
        .collect())
}
