// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client for the remote ledger service. The service owns all authoritative
//! state; this side only validates input, attaches the bearer token, and
//! turns responses into typed values or [`ApiError`]s.

use crate::error::ApiError;
use crate::models::{Balance, Objective, ObjectiveDraft, RiskProfile, TransactionDraft, User};
use crate::normalize::{parse_amount, parse_id, parse_text, parse_timestamp};
use chrono::NaiveDate;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

const UA: &str = concat!(
    "bankroll/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/bankroll)"
);

#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsKind {
    Overview,
    Monthly,
    Performance,
    Risk,
}

impl AnalyticsKind {
    pub fn path(&self) -> &'static str {
        match self {
            AnalyticsKind::Overview => "analytics/overview",
            AnalyticsKind::Monthly => "analytics/monthly",
            AnalyticsKind::Performance => "stats/performance",
            AnalyticsKind::Risk => "stats/risk-analysis",
        }
    }
}

pub trait LedgerApi {
    fn set_token(&self, token: Option<String>);
    fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError>;
    fn list_transactions(&self) -> Result<Vec<Value>, ApiError>;
    fn create_transaction(&self, draft: &TransactionDraft) -> Result<Value, ApiError>;
    fn update_transaction(&self, id: &str, draft: &TransactionDraft) -> Result<Value, ApiError>;
    fn delete_transaction(&self, id: &str) -> Result<(), ApiError>;
    fn balance(&self) -> Result<Balance, ApiError>;
    fn list_objectives(&self) -> Result<Vec<Objective>, ApiError>;
    fn create_objective(&self, draft: &ObjectiveDraft) -> Result<Objective, ApiError>;
    fn update_objective(&self, id: &str, draft: &ObjectiveDraft) -> Result<Objective, ApiError>;
    fn delete_objective(&self, id: &str) -> Result<(), ApiError>;
    /// `None` when the user has not set up a profile yet.
    fn risk_profile(&self) -> Result<Option<RiskProfile>, ApiError>;
    fn save_risk_profile(&self, profile: &RiskProfile) -> Result<RiskProfile, ApiError>;
    fn analytics(&self, kind: AnalyticsKind) -> Result<Value, ApiError>;
}

/// Checks run before any request leaves the process.
pub fn validate_transaction(draft: &TransactionDraft) -> Result<(), ApiError> {
    if draft.amount <= Decimal::ZERO {
        return Err(ApiError::Validation("amount must be greater than zero".into()));
    }
    if draft.is_initial_bank
        && draft.r#type == crate::models::TxType::Deposit
        && draft.amount < Decimal::ONE
    {
        return Err(ApiError::Validation(
            "initial bankroll must be at least 1.00".into(),
        ));
    }
    Ok(())
}

pub fn validate_objective(draft: &ObjectiveDraft) -> Result<(), ApiError> {
    if draft.title.trim().is_empty() {
        return Err(ApiError::Validation("objective title is required".into()));
    }
    if draft.target_amount <= Decimal::ZERO {
        return Err(ApiError::Validation("target amount must be greater than zero".into()));
    }
    if draft.current_amount < Decimal::ZERO {
        return Err(ApiError::Validation("current amount cannot be negative".into()));
    }
    Ok(())
}

pub fn transaction_body(draft: &TransactionDraft) -> Value {
    json!({
        "type": draft.r#type.as_str(),
        "amount": draft.amount.to_string(),
        "date": draft.date.format("%Y-%m-%d").to_string(),
        "description": draft
            .description
            .clone()
            .unwrap_or_else(|| draft.r#type.default_description().to_string()),
        "category": draft
            .category
            .clone()
            .unwrap_or_else(|| draft.r#type.default_category().to_string()),
        "isInitialBank": draft.is_initial_bank,
    })
}

fn objective_body(draft: &ObjectiveDraft) -> Value {
    json!({
        "title": draft.title.trim(),
        "description": draft.description,
        "target_amount": draft.target_amount.to_string(),
        "current_amount": draft.current_amount.to_string(),
        "target_date": draft.target_date.map(|d| d.format("%Y-%m-%d").to_string()),
        "category": draft.category,
    })
}

fn profile_body(p: &RiskProfile) -> Value {
    json!({
        "profile": { "id": p.profile_type },
        "riskLevel": p.risk_level,
        "initialBalance": p.initial_balance.to_string(),
        "bankroll": p.initial_balance.to_string(),
        "stopLoss": p.stop_loss.to_string(),
        "stopLossPercentage": p.stop_loss_percentage.to_string(),
        "profitTarget": p.profit_target.to_string(),
    })
}

/// `data` envelope when present, otherwise the body itself.
fn payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn payload_list(body: Value) -> Result<Vec<Value>, ApiError> {
    match payload(body) {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(ApiError::Decode(format!("expected a list, got {}", kind_of(&other)))),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// First present key; the service mixes snake_case and camelCase.
fn field<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| v.get(*k)).filter(|x| !x.is_null())
}

fn parse_date_field(v: Option<&Value>) -> Option<NaiveDate> {
    let s = v.and_then(Value::as_str)?;
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(v).map(|ts| ts.date_naive()))
}

pub fn objective_from_wire(v: &Value) -> Result<Objective, ApiError> {
    let id = parse_id(v.get("id"));
    if id.is_empty() {
        return Err(ApiError::Decode("objective without id".into()));
    }
    Ok(Objective {
        id,
        title: parse_text(v.get("title")).unwrap_or_default(),
        description: parse_text(v.get("description")),
        target_amount: parse_amount(field(v, &["target_amount", "targetAmount"])),
        current_amount: parse_amount(field(v, &["current_amount", "currentAmount"])),
        target_date: parse_date_field(field(v, &["target_date", "targetDate", "deadline"])),
        category: parse_text(v.get("category")),
    })
}

pub fn profile_from_wire(v: &Value) -> RiskProfile {
    let risk_level = field(v, &["risk_level", "riskLevel"])
        .and_then(|r| r.as_u64().or_else(|| r.as_str().and_then(|s| s.trim().parse().ok())))
        .map(|r| r.min(10) as u8)
        .unwrap_or(5);
    let id = parse_id(v.get("id"));
    RiskProfile {
        id: (!id.is_empty()).then_some(id),
        profile_type: parse_text(field(v, &["profile_type", "profileType"])),
        risk_level,
        initial_balance: parse_amount(field(v, &["initial_balance", "initialBalance", "bankroll"])),
        stop_loss_percentage: parse_amount(field(
            v,
            &["stop_loss_percentage", "stopLossPercentage"],
        )),
        stop_loss: parse_amount(field(v, &["stop_loss", "stopLoss"])),
        profit_target: parse_amount(field(v, &["profit_target", "profitTarget"])),
    }
}

pub fn balance_from_wire(v: &Value) -> Balance {
    let v = match v.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => v,
    };
    Balance {
        current: parse_amount(v.get("balance")),
        initial: parse_amount(field(v, &["initial_bank", "initialBank"])).max(Decimal::ZERO),
    }
}

pub fn user_from_wire(v: &Value) -> Result<User, ApiError> {
    let id = parse_id(v.get("id"));
    if id.is_empty() {
        return Err(ApiError::Decode("login response without user id".into()));
    }
    Ok(User {
        id,
        name: parse_text(v.get("name")).unwrap_or_default(),
        email: parse_text(v.get("email")).unwrap_or_default(),
    })
}

pub struct HttpApi {
    client: Client,
    base: String,
    token: Mutex<Option<String>>,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(UA)
            .build()?;
        Ok(HttpApi {
            client,
            base: base_url.trim().trim_end_matches('/').to_string(),
            token: Mutex::new(token),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.client.request(method, self.url(path));
        match self.token() {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    fn send(&self, req: RequestBuilder) -> Result<Value, ApiError> {
        let resp = req.send()?;
        let status = resp.status();
        let url = resp.url().to_string();
        let text = resp.text()?;
        debug!(%url, status = status.as_u16(), "api response");
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!(%url, "token rejected, clearing it");
            if let Ok(mut t) = self.token.lock() {
                *t = None;
            }
            return Err(ApiError::Unauthorized);
        }
        let message = body
            .get("error")
            .or_else(|| body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                }),
            });
        }
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| "request failed".to_string()),
            });
        }
        Ok(body)
    }
}

impl LedgerApi for HttpApi {
    fn set_token(&self, token: Option<String>) {
        if let Ok(mut t) = self.token.lock() {
            *t = token;
        }
    }

    fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation("email and password are required".into()));
        }
        let body = self.send(
            self.request(Method::POST, "auth/login")
                .json(&json!({ "email": email.trim(), "password": password })),
        )?;
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Decode("login response without token".into()))?
            .to_string();
        let user = user_from_wire(body.get("user").unwrap_or(&Value::Null))?;
        self.set_token(Some(token.clone()));
        Ok(AuthSession { token, user })
    }

    fn list_transactions(&self) -> Result<Vec<Value>, ApiError> {
        payload_list(self.send(self.request(Method::GET, "transactions"))?)
    }

    fn create_transaction(&self, draft: &TransactionDraft) -> Result<Value, ApiError> {
        validate_transaction(draft)?;
        let body = self.send(
            self.request(Method::POST, "transactions")
                .json(&transaction_body(draft)),
        )?;
        Ok(payload(body))
    }

    fn update_transaction(&self, id: &str, draft: &TransactionDraft) -> Result<Value, ApiError> {
        validate_transaction(draft)?;
        let body = self.send(
            self.request(Method::PUT, &format!("transactions/{}", id))
                .json(&transaction_body(draft)),
        )?;
        Ok(payload(body))
    }

    fn delete_transaction(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &format!("transactions/{}", id)))?;
        Ok(())
    }

    fn balance(&self) -> Result<Balance, ApiError> {
        let body = self.send(self.request(Method::GET, "balance"))?;
        Ok(balance_from_wire(&body))
    }

    fn list_objectives(&self) -> Result<Vec<Objective>, ApiError> {
        let items = payload_list(self.send(self.request(Method::GET, "objectives"))?)?;
        let mut out = Vec::with_capacity(items.len());
        for item in &items {
            match objective_from_wire(item) {
                Ok(o) => out.push(o),
                Err(e) => warn!(error = %e, "skipping malformed objective"),
            }
        }
        Ok(out)
    }

    fn create_objective(&self, draft: &ObjectiveDraft) -> Result<Objective, ApiError> {
        validate_objective(draft)?;
        let body = self.send(
            self.request(Method::POST, "objectives")
                .json(&objective_body(draft)),
        )?;
        objective_from_wire(&payload(body))
    }

    fn update_objective(&self, id: &str, draft: &ObjectiveDraft) -> Result<Objective, ApiError> {
        validate_objective(draft)?;
        let body = self.send(
            self.request(Method::PUT, &format!("objectives/{}", id))
                .json(&objective_body(draft)),
        )?;
        let data = payload(body);
        // Some deployments answer an update with a bare `{success: true}`.
        if data.get("id").is_none() {
            return Ok(Objective {
                id: id.to_string(),
                title: draft.title.trim().to_string(),
                description: draft.description.clone(),
                target_amount: draft.target_amount,
                current_amount: draft.current_amount,
                target_date: draft.target_date,
                category: draft.category.clone(),
            });
        }
        objective_from_wire(&data)
    }

    fn delete_objective(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &format!("objectives/{}", id)))?;
        Ok(())
    }

    fn risk_profile(&self) -> Result<Option<RiskProfile>, ApiError> {
        match self.send(self.request(Method::GET, "betting-profiles")) {
            Ok(body) => match payload(body) {
                Value::Null => Ok(None),
                data => Ok(Some(profile_from_wire(&data))),
            },
            Err(ApiError::Http { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save_risk_profile(&self, profile: &RiskProfile) -> Result<RiskProfile, ApiError> {
        if profile.stop_loss_percentage < Decimal::ZERO
            || profile.stop_loss_percentage >= Decimal::ONE_HUNDRED
        {
            return Err(ApiError::Validation(
                "stop-loss percentage must be between 0 and 100".into(),
            ));
        }
        if profile.risk_level > 10 {
            return Err(ApiError::Validation("risk level must be between 0 and 10".into()));
        }
        let req = match &profile.id {
            Some(id) => self.request(Method::PUT, &format!("betting-profiles/{}", id)),
            None => self.request(Method::POST, "betting-profiles"),
        };
        let data = payload(self.send(req.json(&profile_body(profile)))?);
        if data.get("id").is_none() {
            return Ok(profile.clone());
        }
        let mut saved = profile_from_wire(&data);
        // Older servers omit the percentage on write.
        if saved.stop_loss_percentage.is_zero() {
            saved.stop_loss_percentage = profile.stop_loss_percentage;
        }
        Ok(saved)
    }

    fn analytics(&self, kind: AnalyticsKind) -> Result<Value, ApiError> {
        Ok(payload(self.send(self.request(Method::GET, kind.path()))?))
    }
}
