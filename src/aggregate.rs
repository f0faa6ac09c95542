// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived ledger figures: totals per type, time-bucketed totals, and
//! running-balance series for charts.

use crate::models::{Balance, Transaction, TxType};
use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeTotals {
    pub deposit: Decimal,
    pub withdraw: Decimal,
    pub gains: Decimal,
    pub losses: Decimal,
}

impl TypeTotals {
    /// Returns false, leaving the totals untouched, when the record would overflow.
    pub fn add(&mut self, tx: &Transaction) -> bool {
        let slot = match tx.r#type {
            TxType::Deposit => &mut self.deposit,
            TxType::Withdraw => &mut self.withdraw,
            TxType::Gains => &mut self.gains,
            TxType::Losses => &mut self.losses,
        };
        match slot.checked_add(tx.amount) {
            Some(sum) => {
                *slot = sum;
                true
            }
            None => {
                debug!(id = %tx.id, amount = %tx.amount, "total would overflow, record skipped");
                false
            }
        }
    }

    pub fn get(&self, t: TxType) -> Decimal {
        match t {
            TxType::Deposit => self.deposit,
            TxType::Withdraw => self.withdraw,
            TxType::Gains => self.gains,
            TxType::Losses => self.losses,
        }
    }

    pub fn net(&self) -> Decimal {
        self.deposit
            .saturating_add(self.gains)
            .saturating_sub(self.withdraw)
            .saturating_sub(self.losses)
    }
}

pub fn totals_by_type(txs: &[Transaction]) -> TypeTotals {
    let mut totals = TypeTotals::default();
    for tx in txs {
        totals.add(tx);
    }
    totals
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucketing {
    /// Local `HH:00`.
    Hour,
    /// UTC `YYYY-MM-DD`.
    Day,
    /// UTC `YYYY-MM`.
    Month,
}

impl Bucketing {
    pub fn key<Tz>(&self, ts: DateTime<Utc>, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match self {
            Bucketing::Hour => ts.with_timezone(tz).format("%H:00").to_string(),
            Bucketing::Day => ts.format("%Y-%m-%d").to_string(),
            Bucketing::Month => ts.format("%Y-%m").to_string(),
        }
    }

    /// Hour buckets follow creation time; day and month buckets follow the logical date.
    pub fn timestamp_for(&self, tx: &Transaction) -> Option<DateTime<Utc>> {
        match self {
            Bucketing::Hour => tx.created_at.or(tx.date),
            Bucketing::Day | Bucketing::Month => tx.date,
        }
    }
}

impl FromStr for Bucketing {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hour" | "hourly" => Ok(Bucketing::Hour),
            "day" | "daily" => Ok(Bucketing::Day),
            "month" | "monthly" => Ok(Bucketing::Month),
            other => Err(anyhow!("Invalid bucketing '{}', expected hour|day|month", other)),
        }
    }
}

/// Longest accepted `Nd` window, a century.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Window {
    /// Local calendar day of `now`.
    Today,
    /// The last N days up to `now`.
    Days(i64),
    /// Everything, walked forward from the initial balance.
    All,
}

impl FromStr for Window {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "today" => return Ok(Window::Today),
            "all" => return Ok(Window::All),
            _ => {}
        }
        let digits = s
            .strip_suffix("days")
            .or_else(|| s.strip_suffix('d'))
            .unwrap_or(&s);
        match digits.parse::<i64>() {
            Ok(n) if n > 0 && n <= MAX_WINDOW_DAYS => Ok(Window::Days(n)),
            Ok(n) if n > MAX_WINDOW_DAYS => Err(anyhow!(
                "Window '{}' is too long, at most {} days (use 'all' for everything)",
                s,
                MAX_WINDOW_DAYS
            )),
            _ => Err(anyhow!("Invalid window '{}', expected today|7d|30d|90d|all", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub key: String,
    pub balance: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRequest {
    pub window: Window,
    pub bucketing: Bucketing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub totals: TypeTotals,
    pub series: Vec<SeriesPoint>,
    /// `initial + net(all) - current`. Non-zero means the all-time and
    /// windowed series will disagree on historical balances.
    pub drift: Decimal,
}

pub fn aggregate<Tz>(
    txs: &[Transaction],
    req: SeriesRequest,
    balance: Balance,
    now: &DateTime<Tz>,
) -> Aggregate
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let totals = totals_by_type(txs);
    Aggregate {
        totals,
        series: running_balance(txs, req, balance, now),
        drift: balance
            .initial
            .saturating_add(totals.net())
            .saturating_sub(balance.current),
    }
}

/// Balance after each bucket.
///
/// Windowed modes anchor at `balance.current`: the window's opening balance is
/// recovered by undoing the window's own transactions in reverse, so the last
/// point always equals the current balance. `Window::All` instead starts from
/// `balance.initial` and walks every transaction forward.
pub fn running_balance<Tz>(
    txs: &[Transaction],
    req: SeriesRequest,
    balance: Balance,
    now: &DateTime<Tz>,
) -> Vec<SeriesPoint>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);
    if txs.is_empty() {
        return vec![SeriesPoint {
            key: req.bucketing.key(now_utc, &tz),
            balance: balance.current,
            transaction_count: 0,
        }];
    }

    let mut timeline: Vec<(DateTime<Utc>, &Transaction)> = txs
        .iter()
        .filter_map(|tx| match tx.timeline_at() {
            Some(ts) => Some((ts, tx)),
            None => {
                debug!(id = %tx.id, "transaction without a usable timestamp skipped from series");
                None
            }
        })
        .collect();
    timeline.sort_by_key(|(ts, _)| *ts);

    let (opening, window_start) = match req.window {
        Window::All => (balance.initial, None),
        Window::Today | Window::Days(_) => {
            let today = now.date_naive();
            let start = match req.window {
                Window::Days(n) => Duration::try_days(n)
                    .and_then(|span| now_utc.checked_sub_signed(span))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
                _ => now_utc,
            };
            timeline.retain(|(ts, _)| {
                *ts <= now_utc
                    && match req.window {
                        Window::Today => ts.with_timezone(&tz).date_naive() == today,
                        _ => *ts >= start,
                    }
            });
            let opening = timeline
                .iter()
                .rev()
                .fold(balance.current, |bal, (_, tx)| bal.saturating_sub(tx.signed_amount()));
            (opening, Some(start))
        }
    };

    if timeline.is_empty() {
        let at = window_start.unwrap_or(now_utc);
        let fallback = if req.window == Window::All {
            balance.initial
        } else {
            balance.current
        };
        return vec![SeriesPoint {
            key: req.bucketing.key(at, &tz),
            balance: fallback,
            transaction_count: 0,
        }];
    }

    let mut running = opening;
    let mut points: Vec<SeriesPoint> = Vec::new();
    for (ts, tx) in timeline {
        running = running.saturating_add(tx.signed_amount());
        let key = req.bucketing.key(ts, &tz);
        match points.last_mut() {
            Some(last) if last.key == key => {
                last.balance = running;
                last.transaction_count += 1;
            }
            _ => points.push(SeriesPoint {
                key,
                balance: running,
                transaction_count: 1,
            }),
        }
    }
    points
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketTotals {
    pub key: String,
    pub totals: TypeTotals,
    pub net: Decimal,
    pub count: usize,
}

/// Per-bucket sums, ascending by key. Records with no usable timestamp are skipped.
pub fn bucket_totals<Tz>(txs: &[Transaction], bucketing: Bucketing, tz: &Tz) -> Vec<BucketTotals>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut map: BTreeMap<String, (TypeTotals, usize)> = BTreeMap::new();
    for tx in txs {
        let Some(ts) = bucketing.timestamp_for(tx) else {
            debug!(id = %tx.id, "transaction without a usable date skipped from buckets");
            continue;
        };
        let entry = map.entry(bucketing.key(ts, tz)).or_default();
        if entry.0.add(tx) {
            entry.1 += 1;
        }
    }
    map.into_iter()
        .map(|(key, (totals, count))| BucketTotals {
            key,
            net: totals.net(),
            totals,
            count,
        })
        .collect()
}

pub fn monthly_breakdown(txs: &[Transaction]) -> Vec<BucketTotals> {
    bucket_totals(txs, Bucketing::Month, &Utc)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub amount: Decimal,
    pub count: usize,
}

pub const UNCATEGORIZED: &str = "Other";

/// Outflows (`withdraw` and `losses`) per category, largest first.
pub fn category_breakdown(txs: &[Transaction]) -> Vec<CategoryRow> {
    let mut map: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    for tx in txs.iter().filter(|tx| !tx.r#type.is_credit()) {
        let cat = tx
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let entry = map.entry(cat).or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(tx.amount);
        entry.1 += 1;
    }
    let mut rows: Vec<CategoryRow> = map
        .into_iter()
        .map(|(category, (amount, count))| CategoryRow {
            category,
            amount,
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.amount.cmp(&a.amount));
    rows
}

pub fn unique_categories(txs: &[Transaction]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for cat in txs.iter().filter_map(|tx| tx.category.as_ref()) {
        if !out.contains(cat) {
            out.push(cat.clone());
        }
    }
    out
}

/// Initial bankroll derived from `is_initial_bank` entries, never below zero.
pub fn initial_bank_from_ledger(txs: &[Transaction]) -> Decimal {
    let total: Decimal = txs
        .iter()
        .filter(|tx| tx.is_initial_bank)
        .fold(Decimal::ZERO, |acc, tx| match tx.r#type {
            TxType::Deposit => acc.saturating_add(tx.amount),
            TxType::Withdraw => acc.saturating_sub(tx.amount),
            _ => acc,
        });
    total.max(Decimal::ZERO)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerFigures {
    pub totals: TypeTotals,
    pub real_profit: Decimal,
    pub operational_balance: Decimal,
    pub initial_from_ledger: Decimal,
    pub effective_initial: Decimal,
    pub overall_profit: Decimal,
}

impl LedgerFigures {
    pub fn compute(txs: &[Transaction], balance: Balance) -> Self {
        let totals = totals_by_type(txs);
        let real_profit = totals.gains.saturating_sub(totals.losses);
        let initial_from_ledger = initial_bank_from_ledger(txs);
        let effective_initial = if balance.initial > Decimal::ZERO {
            balance.initial
        } else {
            initial_from_ledger
        };
        LedgerFigures {
            totals,
            real_profit,
            operational_balance: totals
                .deposit
                .saturating_sub(totals.withdraw)
                .saturating_add(real_profit),
            initial_from_ledger,
            effective_initial,
            overall_profit: balance.current.saturating_sub(effective_initial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_parses_common_spellings() {
        assert_eq!("7d".parse::<Window>().unwrap(), Window::Days(7));
        assert_eq!("30days".parse::<Window>().unwrap(), Window::Days(30));
        assert_eq!(" ALL ".parse::<Window>().unwrap(), Window::All);
        assert_eq!("today".parse::<Window>().unwrap(), Window::Today);
        assert!("0d".parse::<Window>().is_err());
        assert_eq!("36500d".parse::<Window>().unwrap(), Window::Days(MAX_WINDOW_DAYS));
        assert!("36501d".parse::<Window>().is_err());
        assert!("100000000d".parse::<Window>().is_err());
        assert!("week".parse::<Window>().is_err());
    }
}
