// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::{CalendarCell, MonthGrid, bucket_by_day};
use crate::config::Config;
use crate::state::LedgerState;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_month, pretty_table};
use anyhow::{Result, anyhow};
use chrono::{Datelike, Local, NaiveDate};

/// Grid for `--month`, the month of `--day`, or the month of `today`.
pub fn grid(state: &LedgerState, m: &clap::ArgMatches, today: NaiveDate) -> Result<MonthGrid> {
    let day = m.get_one::<String>("day").map(|d| parse_date(d)).transpose()?;
    let (year, month) = match (m.get_one::<String>("month"), day) {
        (Some(s), _) => parse_month(s)?,
        (None, Some(d)) => (d.year(), d.month()),
        (None, None) => (today.year(), today.month()),
    };
    let buckets = bucket_by_day(&state.transactions);
    MonthGrid::build(year, month, &buckets, today)
}

fn cell_text(cell: &CalendarCell, ccy: &str) -> String {
    match cell {
        CalendarCell::Padding { day } => format!("({})", day),
        CalendarCell::Day(d) => {
            let mut s = d.date.day().to_string();
            if d.is_today {
                s.push('*');
            }
            if !d.summary.gains.is_zero() {
                s.push_str(&format!("\n+{}", fmt_money(&d.summary.gains, ccy)));
            }
            if !d.summary.losses.is_zero() {
                s.push_str(&format!("\n-{}", fmt_money(&d.summary.losses, ccy)));
            }
            s
        }
    }
}

pub fn handle(state: &LedgerState, cfg: &Config, m: &clap::ArgMatches) -> Result<()> {
    let json = m.get_flag("json");
    let jsonl = m.get_flag("jsonl");
    let g = grid(state, m, Local::now().date_naive())?;

    if let Some(d) = m.get_one::<String>("day") {
        let date = parse_date(d)?;
        let cell = g
            .day(date)
            .ok_or_else(|| anyhow!("{} is not in {}-{:02}", date, g.year, g.month))?;
        if maybe_print_json(json, jsonl, cell)? {
            return Ok(());
        }
        let rows = cell
            .transactions
            .iter()
            .map(|t| {
                vec![
                    t.r#type.to_string(),
                    fmt_money(&t.amount, &cfg.currency),
                    t.category.clone().unwrap_or_default(),
                    t.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Type", "Amount", "Category", "Description"], rows));
        println!(
            "{}: gains {}, losses {}, {} transaction(s)",
            cell.key,
            fmt_money(&cell.summary.gains, &cfg.currency),
            fmt_money(&cell.summary.losses, &cfg.currency),
            cell.summary.count
        );
        return Ok(());
    }

    if maybe_print_json(json, jsonl, &g)? {
        return Ok(());
    }
    let rows = g
        .weeks()
        .map(|week| week.iter().map(|c| cell_text(c, &cfg.currency)).collect())
        .collect();
    println!("{}-{:02}", g.year, g.month);
    println!(
        "{}",
        pretty_table(&["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"], rows)
    );
    let total = g.month_summary();
    println!(
        "Month: gains {}, losses {}, {} transaction(s)",
        fmt_money(&total.gains, &cfg.currency),
        fmt_money(&total.losses, &cfg.currency),
        total.count
    );
    Ok(())
}
