// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use bankroll::aggregate::{
    Bucketing, LedgerFigures, SeriesRequest, TypeTotals, Window, aggregate, category_breakdown,
    monthly_breakdown, running_balance, totals_by_type, unique_categories,
};
use bankroll::models::{Balance, Transaction, TxType};
use bankroll::normalize::normalize_all;
use serde_json::json;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn tx(id: &str, t: TxType, amount: i64, when: DateTime<Utc>) -> Transaction {
    Transaction {
        id: id.into(),
        r#type: t,
        amount: Decimal::from(amount),
        date: Some(when),
        created_at: Some(when),
        category: None,
        description: None,
        is_initial_bank: false,
    }
}

fn sample() -> Vec<Transaction> {
    let mut first = tx("1", TxType::Deposit, 1000, at(2024, 3, 1, 9));
    first.is_initial_bank = true;
    vec![
        first,
        tx("2", TxType::Gains, 200, at(2024, 3, 2, 9)),
        tx("3", TxType::Losses, 50, at(2024, 3, 3, 9)),
    ]
}

fn bal(current: i64, initial: i64) -> Balance {
    Balance {
        current: Decimal::from(current),
        initial: Decimal::from(initial),
    }
}

#[test]
fn totals_by_type_for_the_reference_ledger() {
    let t = totals_by_type(&sample());
    assert_eq!(t.deposit, Decimal::from(1000));
    assert_eq!(t.gains, Decimal::from(200));
    assert_eq!(t.losses, Decimal::from(50));
    assert_eq!(t.withdraw, Decimal::ZERO);
    assert_eq!(t.net(), Decimal::from(1150));
}

#[test]
fn windowed_series_ends_at_current_balance() {
    let now = at(2024, 3, 4, 12);
    let req = SeriesRequest {
        window: Window::Days(30),
        bucketing: Bucketing::Day,
    };
    let series = running_balance(&sample(), req, bal(1150, 1000), &now);
    let keys: Vec<_> = series.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, ["2024-03-01", "2024-03-02", "2024-03-03"]);
    assert_eq!(series.last().unwrap().balance, Decimal::from(1150));
    assert_eq!(series[0].balance, Decimal::from(1000));
}

#[test]
fn windowed_series_anchors_on_current_even_when_ledger_disagrees() {
    let now = at(2024, 3, 4, 12);
    let req = SeriesRequest {
        window: Window::Days(7),
        bucketing: Bucketing::Day,
    };
    // Server says 1300; the ledger only explains 1150.
    let agg = aggregate(&sample(), req, bal(1300, 0), &now);
    assert_eq!(agg.series.last().unwrap().balance, Decimal::from(1300));
    assert_eq!(agg.drift, Decimal::from(-150));

    let all = running_balance(
        &sample(),
        SeriesRequest {
            window: Window::All,
            bucketing: Bucketing::Day,
        },
        bal(1300, 0),
        &now,
    );
    // All-time walks forward from the initial balance instead.
    assert_eq!(all.last().unwrap().balance, Decimal::from(1150));
}

#[test]
fn empty_ledger_yields_single_point_at_current() {
    let now = at(2024, 3, 4, 12);
    let req = SeriesRequest {
        window: Window::Days(7),
        bucketing: Bucketing::Day,
    };
    let series = running_balance(&[], req, bal(500, 0), &now);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].balance, Decimal::from(500));
    assert_eq!(series[0].transaction_count, 0);
    assert_eq!(series[0].key, "2024-03-04");
}

#[test]
fn same_bucket_transactions_merge() {
    let now = at(2024, 3, 4, 23);
    let txs = vec![
        tx("a", TxType::Gains, 10, at(2024, 3, 4, 9)),
        tx("b", TxType::Losses, 4, at(2024, 3, 4, 9)),
        tx("c", TxType::Gains, 1, at(2024, 3, 4, 15)),
    ];
    let req = SeriesRequest {
        window: Window::Today,
        bucketing: Bucketing::Hour,
    };
    let series = running_balance(&txs, req, bal(107, 0), &now);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].key, "09:00");
    assert_eq!(series[0].transaction_count, 2);
    assert_eq!(series[0].balance, Decimal::from(106));
    assert_eq!(series[1].key, "15:00");
    assert_eq!(series[1].balance, Decimal::from(107));
}

#[test]
fn window_excludes_older_records() {
    let now = at(2024, 3, 20, 12);
    let txs = vec![
        tx("old", TxType::Deposit, 1000, at(2024, 1, 1, 9)),
        tx("new", TxType::Gains, 100, at(2024, 3, 19, 9)),
    ];
    let req = SeriesRequest {
        window: Window::Days(7),
        bucketing: Bucketing::Day,
    };
    let series = running_balance(&txs, req, bal(1100, 1000), &now);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].key, "2024-03-19");
    assert_eq!(series[0].balance, Decimal::from(1100));
}

#[test]
fn monthly_and_category_breakdowns() {
    let mut txs = sample();
    let mut w = tx("4", TxType::Withdraw, 300, at(2024, 4, 1, 9));
    w.category = Some("Rent".into());
    txs.push(w);
    txs.push(tx("5", TxType::Losses, 20, at(2024, 4, 2, 9)));

    let months = monthly_breakdown(&txs);
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].key, "2024-03");
    assert_eq!(months[0].net, Decimal::from(1150));
    assert_eq!(months[1].key, "2024-04");
    assert_eq!(months[1].net, Decimal::from(-320));

    let cats = category_breakdown(&txs);
    assert_eq!(cats[0].category, "Rent");
    assert_eq!(cats[0].amount, Decimal::from(300));
    assert_eq!(cats[1].category, "Other");
    assert_eq!(cats[1].amount, Decimal::from(70));
    assert_eq!(cats[1].count, 2);

    assert_eq!(unique_categories(&txs), vec!["Rent".to_string()]);
}

#[test]
fn ledger_figures_fall_back_to_initial_bank_entries() {
    let f = LedgerFigures::compute(&sample(), bal(1150, 0));
    assert_eq!(f.real_profit, Decimal::from(150));
    assert_eq!(f.operational_balance, Decimal::from(1150));
    assert_eq!(f.initial_from_ledger, Decimal::from(1000));
    assert_eq!(f.effective_initial, Decimal::from(1000));
    assert_eq!(f.overall_profit, Decimal::from(150));

    let g = LedgerFigures::compute(&sample(), bal(1150, 900));
    assert_eq!(g.effective_initial, Decimal::from(900));
}

#[test]
fn window_with_no_matching_records_is_one_point_at_current() {
    let now = at(2024, 3, 20, 12);
    let txs = vec![
        tx("a", TxType::Deposit, 1000, at(2024, 1, 1, 9)),
        tx("b", TxType::Gains, 40, at(2024, 2, 10, 9)),
    ];
    let req = SeriesRequest {
        window: Window::Days(7),
        bucketing: Bucketing::Day,
    };
    let series = running_balance(&txs, req, bal(1040, 1000), &now);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].transaction_count, 0);
    assert_eq!(series[0].balance, Decimal::from(1040));
    assert_eq!(series[0].key, "2024-03-13");
}

#[test]
fn all_time_without_usable_timestamps_is_one_point_at_initial() {
    let now = at(2024, 3, 20, 12);
    let mut undated = tx("a", TxType::Gains, 40, now);
    undated.date = None;
    undated.created_at = None;
    let req = SeriesRequest {
        window: Window::All,
        bucketing: Bucketing::Month,
    };
    let series = running_balance(&[undated], req, bal(1040, 1000), &now);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].transaction_count, 0);
    assert_eq!(series[0].balance, Decimal::from(1000));
    assert_eq!(series[0].key, "2024-03");
}

#[test]
fn huge_window_does_not_overflow_the_clock() {
    let now = at(2024, 3, 20, 12);
    assert!("100000000d".parse::<Window>().is_err());
    // Constructed directly, past the parser's cap.
    let req = SeriesRequest {
        window: Window::Days(i64::MAX),
        bucketing: Bucketing::Day,
    };
    let series = running_balance(&sample(), req, bal(1150, 1000), &now);
    assert_eq!(series.last().unwrap().balance, Decimal::from(1150));
    assert_eq!(series.iter().map(|p| p.transaction_count).sum::<usize>(), 3);
}

#[test]
fn oversized_amount_does_not_abort_totals() {
    let txs = normalize_all(&[
        json!({"id": 1, "type": "gains", "amount": "79228162514264337593543950335"}),
        json!({"id": 2, "type": "gains", "amount": "1"}),
    ]);
    assert_eq!(txs[0].amount, Decimal::ZERO);
    assert_eq!(totals_by_type(&txs).gains, Decimal::ONE);
}

#[test]
fn overflowing_record_is_skipped_not_fatal() {
    let mut totals = TypeTotals::default();
    let mut big = tx("big", TxType::Gains, 0, at(2024, 3, 1, 9));
    big.amount = Decimal::MAX;
    assert!(totals.add(&big));
    assert!(!totals.add(&tx("one", TxType::Gains, 1, at(2024, 3, 1, 10))));
    assert_eq!(totals.gains, Decimal::MAX);
    assert!(totals.add(&tx("l", TxType::Losses, 5, at(2024, 3, 1, 11))));

    let now = at(2024, 3, 2, 0);
    let req = SeriesRequest {
        window: Window::All,
        bucketing: Bucketing::Day,
    };
    let series = running_balance(&[big.clone(), big], req, bal(0, 0), &now);
    assert_eq!(series.last().unwrap().balance, Decimal::MAX);
}
