// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Transaction, TxType};
use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub const GRID_CELLS: usize = 42;

/// Groups by the UTC calendar date of `date` (never `created_at`).
pub fn bucket_by_day(txs: &[Transaction]) -> BTreeMap<String, Vec<Transaction>> {
    let mut map: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
    for tx in txs {
        match tx.date {
            Some(d) => map
                .entry(d.format("%Y-%m-%d").to_string())
                .or_default()
                .push(tx.clone()),
            None => debug!(id = %tx.id, "transaction without a date left off the calendar"),
        }
    }
    map
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DaySummary {
    pub gains: Decimal,
    pub losses: Decimal,
    pub count: usize,
}

pub fn summarize(txs: &[Transaction]) -> DaySummary {
    let mut s = DaySummary {
        count: txs.len(),
        ..DaySummary::default()
    };
    for tx in txs {
        match tx.r#type {
            TxType::Gains => s.gains += tx.amount,
            TxType::Losses => s.losses += tx.amount,
            _ => {}
        }
    }
    s
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub key: String,
    pub is_today: bool,
    pub transactions: Vec<Transaction>,
    pub summary: DaySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CalendarCell {
    /// Neighbouring-month filler: carries only the day number, never selectable.
    Padding { day: u32 },
    Day(DayCell),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    /// Six Sunday-first weeks covering `year-month`.
    pub fn build(
        year: i32,
        month: u32,
        buckets: &BTreeMap<String, Vec<Transaction>>,
        today: NaiveDate,
    ) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("Invalid month {}-{:02}", year, month))?;
        let days_in_month = days_in_month(year, month)?;
        let prev_days = first
            .pred_opt()
            .map(|d| d.day())
            .ok_or_else(|| anyhow!("No month before {}", first))?;

        let mut cells = Vec::with_capacity(GRID_CELLS);
        let lead = first.weekday().num_days_from_sunday();
        for i in (1..=lead).rev() {
            cells.push(CalendarCell::Padding {
                day: prev_days - i + 1,
            });
        }
        for day in 1..=days_in_month {
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                continue;
            };
            let key = date.format("%Y-%m-%d").to_string();
            let transactions = buckets.get(&key).cloned().unwrap_or_default();
            cells.push(CalendarCell::Day(DayCell {
                summary: summarize(&transactions),
                is_today: date == today,
                date,
                key,
                transactions,
            }));
        }
        let mut trailing = 1;
        while cells.len() < GRID_CELLS {
            cells.push(CalendarCell::Padding { day: trailing });
            trailing += 1;
        }
        Ok(MonthGrid { year, month, cells })
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }

    /// Clicking a padding cell selects nothing.
    pub fn select(&self, index: usize) -> Option<&DayCell> {
        match self.cells.get(index)? {
            CalendarCell::Day(cell) => Some(cell),
            CalendarCell::Padding { .. } => None,
        }
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find_map(|c| match c {
            CalendarCell::Day(cell) if cell.date == date => Some(cell),
            _ => None,
        })
    }

    pub fn month_summary(&self) -> DaySummary {
        let mut total = DaySummary::default();
        for c in &self.cells {
            if let CalendarCell::Day(cell) = c {
                total.gains += cell.summary.gains;
                total.losses += cell.summary.losses;
                total.count += cell.summary.count;
            }
        }
        total
    }
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid month {}-{:02}", year, month))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| anyhow!("Invalid month {}-{:02}", year, month))?;
    Ok((next - first).num_days() as u32)
}
