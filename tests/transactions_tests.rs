// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use bankroll::cli;
use bankroll::commands::transactions;
use bankroll::models::{Transaction, TxType};
use bankroll::normalize::normalize;
use bankroll::state::{Action, LedgerState};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

fn state() -> LedgerState {
    let txs = (1..=3)
        .map(|i| {
            normalize(&json!({
                "id": i,
                "type": if i == 2 { "losses" } else { "gains" },
                "amount": "10",
                "date": format!("2025-01-0{}", i),
                "category": if i == 3 { Some("Football") } else { None },
            }))
        })
        .collect();
    let mut s = LedgerState::default();
    s.dispatch(Action::SetTransactions(
        txs,
        Utc.with_ymd_and_hms(2025, 1, 4, 0, 0, 0).unwrap(),
    ));
    s
}

fn list_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["bankroll", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => match tx_m.subcommand() {
            Some(("list", list_m)) => list_m.clone(),
            _ => panic!("no list subcommand"),
        },
        _ => panic!("no tx subcommand"),
    }
}

#[test]
fn list_limit_respected() {
    let rows = transactions::query_rows(&state(), &list_matches(&["--limit", "2"])).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2025-01-03");
}

#[test]
fn list_filters_by_type_and_category() {
    let s = state();
    let losses = transactions::query_rows(&s, &list_matches(&["--type", "losses"])).unwrap();
    assert_eq!(losses.len(), 1);
    assert_eq!(losses[0].id, "2");

    let other = transactions::query_rows(&s, &list_matches(&["--category", "other"])).unwrap();
    assert_eq!(other.len(), 2);
    let football = transactions::query_rows(&s, &list_matches(&["--category", "football"])).unwrap();
    assert_eq!(football.len(), 1);

    let feb = transactions::query_rows(&s, &list_matches(&["--month", "2025-02"])).unwrap();
    assert!(feb.is_empty());
}

#[test]
fn unknown_type_is_rejected_by_the_parser() {
    let res = cli::build_cli().try_get_matches_from(["bankroll", "tx", "list", "--type", "bonus"]);
    assert!(res.is_err());
}

#[test]
fn update_draft_keeps_unspecified_fields() {
    let base = Transaction {
        id: "9".into(),
        r#type: TxType::Losses,
        amount: Decimal::from(40),
        date: Some(Utc.with_ymd_and_hms(2025, 1, 2, 15, 0, 0).unwrap()),
        created_at: None,
        category: Some("Tennis".into()),
        description: Some("Set bet".into()),
        is_initial_bank: false,
    };
    let matches = cli::build_cli().get_matches_from(["bankroll", "tx", "update", "9", "--amount", "45"]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("update", up)) = tx_m.subcommand() else {
        panic!("no update subcommand");
    };
    let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    let d = transactions::draft_from_args(up, Some(&base), today).unwrap();
    assert_eq!(d.r#type, TxType::Losses);
    assert_eq!(d.amount, Decimal::from(45));
    assert_eq!(d.date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    assert_eq!(d.category.as_deref(), Some("Tennis"));
}

#[test]
fn add_draft_defaults_date_to_today() {
    let matches = cli::build_cli().get_matches_from([
        "bankroll", "tx", "add", "--type", "gains", "--amount", "12.5",
    ]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("add", add)) = tx_m.subcommand() else {
        panic!("no add subcommand");
    };
    let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    let d = transactions::draft_from_args(add, None, today).unwrap();
    assert_eq!(d.date, today);
    assert_eq!(d.amount, Decimal::new(125, 1));
    assert!(d.category.is_none());
}
