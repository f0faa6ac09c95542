// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use bankroll::models::{Balance, Transaction, TxType};
use bankroll::state::{Action, LedgerState, reduce};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

fn tx(id: &str, amount: i64) -> Transaction {
    Transaction {
        id: id.into(),
        r#type: TxType::Gains,
        amount: Decimal::from(amount),
        date: None,
        created_at: None,
        category: None,
        description: None,
        is_initial_bank: false,
    }
}

#[test]
fn set_transactions_clears_loading_and_error() {
    let at = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
    let s = reduce(LedgerState::default(), Action::Loading(true));
    let s = reduce(s, Action::SetError("offline".into()));
    assert!(!s.loading);
    let s = reduce(s, Action::Loading(true));
    let s = reduce(s, Action::SetTransactions(vec![tx("1", 5)], at));
    assert!(!s.loading);
    assert!(s.error.is_none());
    assert_eq!(s.last_updated, Some(at));
    assert_eq!(s.transactions.len(), 1);
}

#[test]
fn add_update_delete_by_id() {
    let mut s = LedgerState::default();
    s.dispatch(Action::AddTransaction(tx("1", 5)));
    s.dispatch(Action::AddTransaction(tx("2", 7)));
    assert_eq!(s.transactions[0].id, "2");

    // Re-adding an id replaces it instead of duplicating.
    s.dispatch(Action::AddTransaction(tx("1", 6)));
    assert_eq!(s.transactions.len(), 2);

    s.dispatch(Action::UpdateTransaction(tx("2", 70)));
    assert_eq!(
        s.transactions.iter().find(|t| t.id == "2").unwrap().amount,
        Decimal::from(70)
    );
    // Unknown ids are ignored.
    s.dispatch(Action::UpdateTransaction(tx("9", 1)));
    assert_eq!(s.transactions.len(), 2);

    s.dispatch(Action::DeleteTransaction("1".into()));
    assert_eq!(s.transactions.len(), 1);
}

#[test]
fn reset_returns_to_default() {
    let mut s = LedgerState::default();
    s.dispatch(Action::SetBalance(Balance {
        current: Decimal::from(10),
        initial: Decimal::ONE,
    }));
    s.dispatch(Action::SetError("x".into()));
    s.dispatch(Action::Reset);
    assert_eq!(s, LedgerState::default());
}
