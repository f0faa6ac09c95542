// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client-side view of the ledger. Every change goes through [`reduce`],
//! which never touches the network or the clock.

use crate::models::{Balance, Objective, RiskProfile, Transaction};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerState {
    pub transactions: Vec<Transaction>,
    pub balance: Balance,
    pub objectives: Vec<Objective>,
    pub profile: Option<RiskProfile>,
    pub analytics: Option<Value>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Loading(bool),
    SetTransactions(Vec<Transaction>, DateTime<Utc>),
    AddTransaction(Transaction),
    UpdateTransaction(Transaction),
    DeleteTransaction(String),
    SetBalance(Balance),
    SetObjectives(Vec<Objective>),
    AddObjective(Objective),
    UpdateObjective(Objective),
    DeleteObjective(String),
    SetProfile(Option<RiskProfile>),
    SetAnalytics(Value),
    SetError(String),
    ClearError,
    Reset,
}

pub fn reduce(mut state: LedgerState, action: Action) -> LedgerState {
    match action {
        Action::Loading(on) => state.loading = on,
        Action::SetTransactions(txs, at) => {
            state.transactions = txs;
            state.last_updated = Some(at);
            state.loading = false;
            state.error = None;
        }
        // Newest first, matching the server listing.
        Action::AddTransaction(tx) => {
            state.transactions.retain(|t| t.id != tx.id);
            state.transactions.insert(0, tx);
        }
        Action::UpdateTransaction(tx) => {
            if let Some(slot) = state.transactions.iter_mut().find(|t| t.id == tx.id) {
                *slot = tx;
            }
        }
        Action::DeleteTransaction(id) => state.transactions.retain(|t| t.id != id),
        Action::SetBalance(b) => state.balance = b,
        Action::SetObjectives(objs) => state.objectives = objs,
        Action::AddObjective(o) => {
            state.objectives.retain(|x| x.id != o.id);
            state.objectives.push(o);
        }
        Action::UpdateObjective(o) => {
            if let Some(slot) = state.objectives.iter_mut().find(|x| x.id == o.id) {
                *slot = o;
            }
        }
        Action::DeleteObjective(id) => state.objectives.retain(|o| o.id != id),
        Action::SetProfile(p) => state.profile = p,
        Action::SetAnalytics(v) => state.analytics = Some(v),
        Action::SetError(e) => {
            state.error = Some(e);
            state.loading = false;
        }
        Action::ClearError => state.error = None,
        Action::Reset => state = LedgerState::default(),
    }
    state
}

impl LedgerState {
    pub fn dispatch(&mut self, action: Action) {
        *self = reduce(std::mem::take(self), action);
    }
}
