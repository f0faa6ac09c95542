// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use bankroll::calendar::{CalendarCell, GRID_CELLS, MonthGrid, bucket_by_day, days_in_month};
use bankroll::models::{Transaction, TxType};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

fn tx(id: &str, t: TxType, amount: i64, date: Option<&str>) -> Transaction {
    Transaction {
        id: id.into(),
        r#type: t,
        amount: Decimal::from(amount),
        date: date.map(|s| s.parse().unwrap()),
        created_at: Some(Utc.with_ymd_and_hms(2024, 3, 16, 1, 0, 0).unwrap()),
        category: None,
        description: None,
        is_initial_bank: false,
    }
}

#[test]
fn buckets_by_utc_date_of_the_logical_date() {
    let txs = vec![
        tx("1", TxType::Gains, 10, Some("2024-03-15T08:00:00Z")),
        tx("2", TxType::Losses, 4, Some("2024-03-15T23:59:59Z")),
        tx("3", TxType::Gains, 1, None),
    ];
    let buckets = bucket_by_day(&txs);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets["2024-03-15"].len(), 2);
    // created_at is ignored.
    assert!(!buckets.contains_key("2024-03-16"));
}

#[test]
fn march_2024_grid_layout() {
    let txs = vec![
        tx("1", TxType::Gains, 10, Some("2024-03-15T08:00:00Z")),
        tx("2", TxType::Losses, 4, Some("2024-03-15T12:00:00Z")),
        tx("3", TxType::Deposit, 100, Some("2024-03-01T12:00:00Z")),
    ];
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let grid = MonthGrid::build(2024, 3, &bucket_by_day(&txs), today).unwrap();
    assert_eq!(grid.cells.len(), GRID_CELLS);
    assert_eq!(grid.weeks().count(), 6);

    // 2024-03-01 is a Friday: five leading days from February (25..29).
    assert_eq!(grid.cells[0], CalendarCell::Padding { day: 25 });
    assert_eq!(grid.cells[4], CalendarCell::Padding { day: 29 });
    assert!(grid.select(0).is_none());
    let first = grid.select(5).unwrap();
    assert_eq!(first.key, "2024-03-01");
    assert_eq!(first.summary.count, 1);
    assert!(first.summary.gains.is_zero());

    let ides = grid.day(today).unwrap();
    assert!(ides.is_today);
    assert_eq!(ides.summary.gains, Decimal::from(10));
    assert_eq!(ides.summary.losses, Decimal::from(4));

    // Trailing padding restarts at 1.
    assert_eq!(grid.cells[5 + 31], CalendarCell::Padding { day: 1 });
    assert!(grid.select(GRID_CELLS - 1).is_none());

    let month = grid.month_summary();
    assert_eq!(month.count, 3);
}

#[test]
fn empty_days_are_still_cells() {
    let today = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let grid = MonthGrid::build(2024, 2, &bucket_by_day(&[]), today).unwrap();
    let days = grid
        .cells
        .iter()
        .filter(|c| matches!(c, CalendarCell::Day(_)))
        .count();
    assert_eq!(days, 29);
    assert_eq!(days_in_month(2023, 2).unwrap(), 28);
    assert!(MonthGrid::build(2024, 13, &bucket_by_day(&[]), today).is_err());
}
