// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Coercion of loosely-typed ledger records (server payloads, cached JSON)
//! into [`Transaction`]. Nothing in here fails: malformed fields fall back
//! to a neutral value so one bad record never poisons a whole list.

use crate::models::{Transaction, TxType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

pub fn normalize(raw: &Value) -> Transaction {
    let signed = parse_amount(raw.get("amount"));
    let r#type = raw
        .get("type")
        .and_then(Value::as_str)
        .and_then(TxType::parse)
        .unwrap_or(if signed >= Decimal::ZERO {
            TxType::Deposit
        } else {
            TxType::Withdraw
        });

    Transaction {
        id: parse_id(raw.get("id")),
        r#type,
        amount: signed.abs(),
        date: parse_timestamp(raw.get("date")),
        created_at: parse_timestamp(raw.get("created_at")),
        category: parse_text(raw.get("category")),
        description: parse_text(raw.get("description")),
        is_initial_bank: parse_flag(raw.get("is_initial_bank").or(raw.get("isInitialBank"))),
    }
}

pub fn normalize_all(raws: &[Value]) -> Vec<Transaction> {
    raws.iter().map(normalize).collect()
}

/// Largest magnitude accepted for a single amount. Keeps sums over any
/// realistic ledger far away from `Decimal::MAX`.
pub fn amount_ceiling() -> Decimal {
    Decimal::from(1_000_000_000_000_000_i64)
}

/// Signed amount; anything unparseable or beyond [`amount_ceiling`] is zero.
pub fn parse_amount(v: Option<&Value>) -> Decimal {
    let parsed = match v {
        Some(Value::Number(n)) => parse_decimal_text(&n.to_string()),
        Some(Value::String(s)) => parse_decimal_text(s),
        _ => None,
    };
    match parsed {
        Some(d) if d.abs() <= amount_ceiling() => d,
        Some(d) => {
            debug!(value = %d, "amount out of range, using 0");
            Decimal::ZERO
        }
        None => {
            if let Some(v) = v {
                debug!(value = %v, "unparseable amount, using 0");
            }
            Decimal::ZERO
        }
    }
}

fn parse_decimal_text(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
        .or_else(|| {
            // Leading numeric prefix, e.g. "12.50 BRL".
            let end = s
                .char_indices()
                .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
                .map(|(i, c)| i + c.len_utf8())
                .last()?;
            Decimal::from_str(&s[..end]).ok()
        })
}

/// Accepts RFC 3339, RFC 2822, naive ISO timestamps (read as UTC), bare dates
/// (UTC midnight) and epoch numbers (milliseconds when large, else seconds).
pub fn parse_timestamp(v: Option<&Value>) -> Option<DateTime<Utc>> {
    match v? {
        Value::String(s) => parse_timestamp_text(s),
        Value::Number(n) => {
            let n = n.as_i64()?;
            if n.abs() >= 100_000_000_000 {
                Utc.timestamp_millis_opt(n).single()
            } else {
                Utc.timestamp_opt(n, 0).single()
            }
        }
        _ => None,
    }
}

pub fn parse_timestamp_text(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    debug!(value = s, "unparseable timestamp");
    None
}

pub fn parse_id(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub fn parse_text(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_flag(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}
