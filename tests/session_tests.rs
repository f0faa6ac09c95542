// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use bankroll::api::{AnalyticsKind, AuthSession, LedgerApi};
use bankroll::commands::auth::sign_in;
use bankroll::config;
use bankroll::db::init_schema;
use bankroll::error::ApiError;
use bankroll::models::{
    Balance, Objective, ObjectiveDraft, RiskProfile, TransactionDraft, TxType, User,
};
use bankroll::session::Session;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Ok,
    Offline,
    Expired,
}

/// In-memory stand-in for the ledger service.
struct FakeApi {
    mode: Cell<Mode>,
    txs: RefCell<Vec<Value>>,
    objectives: RefCell<Vec<Objective>>,
    next_id: Cell<u32>,
    calls: Cell<u32>,
    objective_lists: Cell<u32>,
    profile: RefCell<Option<RiskProfile>>,
    token: RefCell<Option<String>>,
}

impl FakeApi {
    fn new(txs: Vec<Value>) -> Self {
        FakeApi {
            mode: Cell::new(Mode::Ok),
            txs: RefCell::new(txs),
            objectives: RefCell::new(Vec::new()),
            next_id: Cell::new(100),
            calls: Cell::new(0),
            objective_lists: Cell::new(0),
            profile: RefCell::new(None),
            token: RefCell::new(Some("tok".into())),
        }
    }

    fn gate(&self) -> Result<(), ApiError> {
        self.calls.set(self.calls.get() + 1);
        match self.mode.get() {
            Mode::Ok => Ok(()),
            Mode::Offline => Err(ApiError::Network("connection refused".into())),
            Mode::Expired => Err(ApiError::Unauthorized),
        }
    }

    fn balance_value(&self) -> Decimal {
        self.txs
            .borrow()
            .iter()
            .map(|v| bankroll::normalize::normalize(v).signed_amount())
            .sum()
    }
}

impl LedgerApi for FakeApi {
    fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    fn login(&self, email: &str, _password: &str) -> Result<AuthSession, ApiError> {
        self.gate()?;
        Ok(AuthSession {
            token: "fresh".into(),
            user: User {
                id: "u1".into(),
                name: "Ana".into(),
                email: email.into(),
            },
        })
    }

    fn list_transactions(&self) -> Result<Vec<Value>, ApiError> {
        self.gate()?;
        Ok(self.txs.borrow().clone())
    }

    fn create_transaction(&self, d: &TransactionDraft) -> Result<Value, ApiError> {
        self.gate()?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let v = json!({
            "id": id,
            "type": d.r#type,
            "amount": d.amount.to_string(),
            "date": d.date.to_string(),
            "created_at": format!("{}T12:00:00Z", d.date),
        });
        self.txs.borrow_mut().insert(0, v.clone());
        Ok(v)
    }

    fn update_transaction(&self, id: &str, d: &TransactionDraft) -> Result<Value, ApiError> {
        self.gate()?;
        let v = json!({"id": id, "type": d.r#type, "amount": d.amount.to_string(), "date": d.date.to_string()});
        for slot in self.txs.borrow_mut().iter_mut() {
            if bankroll::normalize::parse_id(slot.get("id")) == id {
                *slot = v.clone();
            }
        }
        Ok(v)
    }

    fn delete_transaction(&self, id: &str) -> Result<(), ApiError> {
        self.gate()?;
        self.txs
            .borrow_mut()
            .retain(|v| bankroll::normalize::parse_id(v.get("id")) != id);
        Ok(())
    }

    fn balance(&self) -> Result<Balance, ApiError> {
        self.gate()?;
        Ok(Balance {
            current: self.balance_value(),
            initial: Decimal::ZERO,
        })
    }

    fn list_objectives(&self) -> Result<Vec<Objective>, ApiError> {
        self.gate()?;
        self.objective_lists.set(self.objective_lists.get() + 1);
        Ok(self.objectives.borrow().clone())
    }

    fn create_objective(&self, d: &ObjectiveDraft) -> Result<Objective, ApiError> {
        self.gate()?;
        let o = Objective {
            id: format!("o{}", self.objectives.borrow().len() + 1),
            title: d.title.clone(),
            description: d.description.clone(),
            target_amount: d.target_amount,
            current_amount: d.current_amount,
            target_date: d.target_date,
            category: d.category.clone(),
        };
        self.objectives.borrow_mut().push(o.clone());
        Ok(o)
    }

    fn update_objective(&self, id: &str, d: &ObjectiveDraft) -> Result<Objective, ApiError> {
        self.gate()?;
        let mut objs = self.objectives.borrow_mut();
        let o = objs
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(ApiError::Http {
                status: 404,
                message: "not found".into(),
            })?;
        o.current_amount = d.current_amount;
        Ok(o.clone())
    }

    fn delete_objective(&self, id: &str) -> Result<(), ApiError> {
        self.gate()?;
        self.objectives.borrow_mut().retain(|o| o.id != id);
        Ok(())
    }

    fn risk_profile(&self) -> Result<Option<RiskProfile>, ApiError> {
        self.gate()?;
        Ok(self.profile.borrow().clone())
    }

    fn save_risk_profile(&self, p: &RiskProfile) -> Result<RiskProfile, ApiError> {
        self.gate()?;
        *self.profile.borrow_mut() = Some(p.clone());
        Ok(p.clone())
    }

    fn analytics(&self, _kind: AnalyticsKind) -> Result<Value, ApiError> {
        self.gate()?;
        Ok(json!({"ok": true}))
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap()
}

fn seed() -> Vec<Value> {
    vec![
        json!({"id": 1, "type": "deposit", "amount": "1000", "date": "2024-03-01", "is_initial_bank": true}),
        json!({"id": 2, "type": "gains", "amount": "200", "date": "2024-03-15T09:00:00Z"}),
        json!({"id": 3, "type": "losses", "amount": "50", "date": "2024-03-15T10:00:00Z"}),
    ]
}

fn user() -> User {
    User {
        id: "u1".into(),
        name: "Ana".into(),
        email: "ana@example.com".into(),
    }
}

fn db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    config::store_session(&conn, "tok", &user()).unwrap();
    conn
}

fn objective_lists(s: &Session<'_, FakeApi>) -> u32 {
    s.api().objective_lists.get()
}

fn draft(t: TxType, amount: i64) -> TransactionDraft {
    TransactionDraft {
        r#type: t,
        amount: Decimal::from(amount),
        date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        description: None,
        category: None,
        is_initial_bank: false,
    }
}

#[test]
fn refresh_populates_state_cache_and_daily_counters() {
    let conn = db();
    let mut s = Session::start(&conn, FakeApi::new(seed()), user(), &now());
    assert!(s.state().transactions.is_empty());
    s.refresh(&now()).unwrap();

    assert_eq!(s.state().transactions.len(), 3);
    assert_eq!(s.state().balance.current, Decimal::from(1150));
    assert_eq!(s.tracker().totals().gains, Decimal::from(200));
    assert_eq!(s.tracker().totals().losses, Decimal::from(50));

    // A second session starts from the cache alone.
    let offline = FakeApi::new(Vec::new());
    offline.mode.set(Mode::Offline);
    let cached = Session::open(&conn, offline, user(), &now());
    assert_eq!(cached.state().transactions.len(), 3);
    assert_eq!(cached.state().balance.current, Decimal::from(1150));
    assert!(cached.state().error.is_some());
}

#[test]
fn add_transaction_validates_then_refetches() {
    let conn = db();
    let mut s = Session::open(&conn, FakeApi::new(seed()), user(), &now());
    let calls = s.api().calls.get();

    let err = s.add_transaction(&draft(TxType::Gains, 0), &now()).unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(s.api().calls.get(), calls, "validation must not reach the server");

    let tx = s.add_transaction(&draft(TxType::Gains, 25), &now()).unwrap();
    assert_eq!(tx.id, "100");
    assert_eq!(s.state().transactions.len(), 4);
    assert_eq!(s.state().balance.current, Decimal::from(1175));
    assert_eq!(s.tracker().totals().gains, Decimal::from(225));
}

#[test]
fn initial_bank_deposit_needs_at_least_one_unit() {
    let conn = db();
    let mut s = Session::start(&conn, FakeApi::new(Vec::new()), user(), &now());
    let mut d = draft(TxType::Deposit, 0);
    d.amount = Decimal::new(50, 2);
    d.is_initial_bank = true;
    assert!(matches!(
        s.add_transaction(&d, &now()),
        Err(ApiError::Validation(_))
    ));
}

#[test]
fn update_and_delete_flow() {
    let conn = db();
    let mut s = Session::open(&conn, FakeApi::new(seed()), user(), &now());
    s.update_transaction("3", &draft(TxType::Losses, 80), &now())
        .unwrap();
    assert_eq!(s.tracker().totals().losses, Decimal::from(80));

    s.delete_transaction("2", &now()).unwrap();
    assert_eq!(s.state().transactions.len(), 2);
    assert!(s.state().transactions.iter().all(|t| t.id != "2"));
    assert_eq!(s.tracker().totals().gains, Decimal::ZERO);
}

#[test]
fn unauthorized_clears_stored_token() {
    let conn = db();
    let api = FakeApi::new(seed());
    api.mode.set(Mode::Expired);
    let mut s = Session::start(&conn, api, user(), &now());
    let err = s.refresh(&now()).unwrap_err();
    assert!(err.is_unauthorized());
    assert!(config::session_token(&conn).unwrap().is_none());
    assert!(s.api().token.borrow().is_none());
    assert!(s.state().error.is_some());
}

#[test]
fn objectives_crud_refetches_after_each_write() {
    let conn = db();
    let mut s = Session::open(&conn, FakeApi::new(seed()), user(), &now());
    let before = objective_lists(&s);
    let d = ObjectiveDraft {
        title: "Emergency fund".into(),
        description: None,
        target_amount: Decimal::from(500),
        current_amount: Decimal::from(100),
        target_date: None,
        category: None,
    };
    let o = s.add_objective(&d, &now()).unwrap();
    assert_eq!(s.state().objectives.len(), 1);
    assert!(!o.is_complete());
    assert_eq!(objective_lists(&s), before + 1);

    // An objective created on another device shows up after the next write.
    let mut remote = o.clone();
    remote.id = "remote".into();
    remote.title = "Holiday".into();
    s.api().objectives.borrow_mut().push(remote);
    let done = ObjectiveDraft {
        current_amount: Decimal::from(500),
        ..d.clone()
    };
    let o = s.update_objective(&o.id, &done, &now()).unwrap();
    assert!(o.is_complete());
    assert_eq!(s.state().objectives.len(), 2);
    assert!(s.state().objectives.iter().any(|x| x.id == o.id && x.is_complete()));
    assert_eq!(objective_lists(&s), before + 2);

    let blank = ObjectiveDraft {
        title: "  ".into(),
        ..d
    };
    assert!(matches!(
        s.add_objective(&blank, &now()),
        Err(ApiError::Validation(_))
    ));
    assert_eq!(objective_lists(&s), before + 2);

    s.delete_objective(&o.id, &now()).unwrap();
    assert_eq!(s.state().objectives.len(), 1);
    assert_eq!(s.state().objectives[0].id, "remote");
    assert_eq!(objective_lists(&s), before + 3);
}

#[test]
fn saving_profile_refetches() {
    let conn = db();
    let mut s = Session::open(&conn, FakeApi::new(seed()), user(), &now());
    let before = s.api().objective_lists.get();
    let p = RiskProfile {
        risk_level: 3,
        ..RiskProfile::default()
    };
    s.save_profile(&p, &now()).unwrap();
    assert_eq!(s.api().objective_lists.get(), before + 1);
    assert_eq!(s.state().profile.as_ref().map(|p| p.risk_level), Some(3));
}

#[test]
fn damaged_cache_record_does_not_hide_the_rest() {
    let conn = db();
    bankroll::cache::put_json(
        &conn,
        "u1",
        bankroll::cache::keys::TRANSACTIONS,
        &json!([
            {"id": "1", "type": "gains", "amount": "200", "date": "2024-03-15T09:00:00Z"},
            {"id": "2", "type": "bonus", "amount": "oops", "date": 17},
            "not even an object"
        ]),
    )
    .unwrap();
    let offline = FakeApi::new(Vec::new());
    offline.mode.set(Mode::Offline);
    let s = Session::open(&conn, offline, user(), &now());
    let txs = &s.state().transactions;
    assert_eq!(txs.len(), 3);
    let good = txs.iter().find(|t| t.id == "1").unwrap();
    assert_eq!(good.r#type, TxType::Gains);
    assert_eq!(good.amount, Decimal::from(200));
    assert!(s.state().error.is_some());
}

#[test]
fn login_then_logout_wipes_local_data() {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    let s = sign_in(&conn, FakeApi::new(seed()), "ana@example.com", "pw", &now()).unwrap();
    assert_eq!(config::session_token(&conn).unwrap().as_deref(), Some("fresh"));
    assert_eq!(s.state().transactions.len(), 3);
    assert!(
        bankroll::cache::get_raw(&conn, "u1", bankroll::cache::keys::TRANSACTIONS)
            .unwrap()
            .is_some()
    );

    s.logout().unwrap();
    assert!(config::session_user(&conn).unwrap().is_none());
    assert!(
        bankroll::cache::get_raw(&conn, "u1", bankroll::cache::keys::TRANSACTIONS)
            .unwrap()
            .is_none()
    );
}

#[test]
fn analytics_payload_lands_in_state() {
    let conn = db();
    let mut s = Session::start(&conn, FakeApi::new(seed()), user(), &now());
    let kind = bankroll::commands::reports::analytics_kind("performance").unwrap();
    assert_eq!(kind, AnalyticsKind::Performance);
    let v = s.analytics(kind).unwrap();
    assert_eq!(s.state().analytics.as_ref(), Some(&v));
    assert!(bankroll::commands::reports::analytics_kind("weekly").is_err());
}
