// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! One signed-in user's working session: cached view, server refresh,
//! mutations and the daily tracker, all tied to a single database handle.

use crate::api::{AnalyticsKind, LedgerApi, validate_objective, validate_transaction};
use crate::cache::{self, keys};
use crate::config;
use crate::daily::ResetTracker;
use crate::error::ApiError;
use crate::models::{
    Balance, Objective, ObjectiveDraft, RiskProfile, Transaction, TransactionDraft, User,
};
use crate::normalize::{normalize, normalize_all};
use crate::state::{Action, LedgerState};
use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Exchanges credentials for a token and remembers both on this device.
pub fn login<A: LedgerApi>(conn: &Connection, api: &A, email: &str, password: &str) -> Result<User> {
    let auth = api.login(email, password)?;
    config::store_session(conn, &auth.token, &auth.user)?;
    info!(user = %auth.user.id, "signed in");
    Ok(auth.user)
}

pub struct Session<'c, A: LedgerApi> {
    conn: &'c Connection,
    api: A,
    user: User,
    state: LedgerState,
    tracker: ResetTracker<&'c Connection>,
}

impl<'c, A: LedgerApi> Session<'c, A> {
    /// Builds the session from the local cache only.
    pub fn start<Tz: TimeZone>(conn: &'c Connection, api: A, user: User, now: &DateTime<Tz>) -> Self {
        let mut state = LedgerState::default();
        // Cached records go through the normalizer like server payloads, so
        // one damaged entry cannot hide the rest.
        if let Some(raw) = read_cache::<Vec<Value>>(conn, &user.id, keys::TRANSACTIONS) {
            let txs = normalize_all(&raw);
            let at = read_cache::<DateTime<Utc>>(conn, &user.id, keys::LAST_SYNC)
                .unwrap_or_else(|| now.with_timezone(&Utc));
            state.dispatch(Action::SetTransactions(txs, at));
        }
        if let Some(b) = read_cache::<Balance>(conn, &user.id, keys::BALANCE) {
            state.dispatch(Action::SetBalance(b));
        }
        if let Some(objs) = read_cache::<Vec<Objective>>(conn, &user.id, keys::OBJECTIVES) {
            state.dispatch(Action::SetObjectives(objs));
        }
        if let Some(p) = read_cache::<RiskProfile>(conn, &user.id, keys::PROFILE) {
            state.dispatch(Action::SetProfile(Some(p)));
        }
        let tracker = ResetTracker::start(&user.id, conn, now);
        Session {
            conn,
            api,
            user,
            state,
            tracker,
        }
    }

    /// Cache first, then a refresh. A failed refresh leaves the cached view
    /// in place with `state().error` set.
    pub fn open<Tz: TimeZone>(conn: &'c Connection, api: A, user: User, now: &DateTime<Tz>) -> Self {
        let mut session = Session::start(conn, api, user, now);
        if let Err(e) = session.refresh(now) {
            warn!(user = %session.user.id, error = %e, "refresh failed, showing cached data");
        }
        session
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tracker(&self) -> &ResetTracker<&'c Connection> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ResetTracker<&'c Connection> {
        &mut self.tracker
    }

    pub fn refresh<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Result<(), ApiError> {
        self.state.dispatch(Action::Loading(true));
        let fetched = self.fetch_all();
        let (raw, balance, objectives, profile) = match fetched {
            Ok(v) => v,
            Err(e) => return Err(self.fail(e)),
        };
        let txs = normalize_all(&raw);
        debug!(user = %self.user.id, count = txs.len(), "transactions refreshed");
        self.state
            .dispatch(Action::SetTransactions(txs, now.with_timezone(&Utc)));
        self.state.dispatch(Action::SetBalance(balance));
        self.state.dispatch(Action::SetObjectives(objectives));
        self.state.dispatch(Action::SetProfile(profile));
        self.persist();
        self.tracker.recompute(&self.state.transactions, now);
        Ok(())
    }

    #[allow(clippy::type_complexity)]
    fn fetch_all(&self) -> Result<(Vec<Value>, Balance, Vec<Objective>, Option<RiskProfile>), ApiError> {
        let raw = self.api.list_transactions()?;
        let balance = self.api.balance()?;
        let objectives = self.api.list_objectives()?;
        let profile = self.api.risk_profile()?;
        Ok((raw, balance, objectives, profile))
    }

    pub fn add_transaction<Tz: TimeZone>(
        &mut self,
        draft: &TransactionDraft,
        now: &DateTime<Tz>,
    ) -> Result<Transaction, ApiError> {
        validate_transaction(draft)?;
        let created = match self.api.create_transaction(draft) {
            Ok(v) => normalize(&v),
            Err(e) => return Err(self.fail(e)),
        };
        self.state.dispatch(Action::AddTransaction(created.clone()));
        self.refetch(now);
        Ok(created)
    }

    pub fn update_transaction<Tz: TimeZone>(
        &mut self,
        id: &str,
        draft: &TransactionDraft,
        now: &DateTime<Tz>,
    ) -> Result<Transaction, ApiError> {
        validate_transaction(draft)?;
        let mut updated = match self.api.update_transaction(id, draft) {
            Ok(v) => normalize(&v),
            Err(e) => return Err(self.fail(e)),
        };
        if updated.id.is_empty() {
            updated.id = id.to_string();
        }
        self.state.dispatch(Action::UpdateTransaction(updated.clone()));
        self.refetch(now);
        Ok(updated)
    }

    pub fn delete_transaction<Tz: TimeZone>(&mut self, id: &str, now: &DateTime<Tz>) -> Result<(), ApiError> {
        if let Err(e) = self.api.delete_transaction(id) {
            return Err(self.fail(e));
        }
        self.state.dispatch(Action::DeleteTransaction(id.to_string()));
        self.refetch(now);
        Ok(())
    }

    pub fn add_objective<Tz: TimeZone>(
        &mut self,
        draft: &ObjectiveDraft,
        now: &DateTime<Tz>,
    ) -> Result<Objective, ApiError> {
        validate_objective(draft)?;
        let created = self.api.create_objective(draft).map_err(|e| self.fail(e))?;
        self.state.dispatch(Action::AddObjective(created.clone()));
        self.refetch(now);
        Ok(created)
    }

    pub fn update_objective<Tz: TimeZone>(
        &mut self,
        id: &str,
        draft: &ObjectiveDraft,
        now: &DateTime<Tz>,
    ) -> Result<Objective, ApiError> {
        validate_objective(draft)?;
        let updated = self.api.update_objective(id, draft).map_err(|e| self.fail(e))?;
        self.state.dispatch(Action::UpdateObjective(updated.clone()));
        self.refetch(now);
        Ok(updated)
    }

    pub fn delete_objective<Tz: TimeZone>(&mut self, id: &str, now: &DateTime<Tz>) -> Result<(), ApiError> {
        self.api.delete_objective(id).map_err(|e| self.fail(e))?;
        self.state.dispatch(Action::DeleteObjective(id.to_string()));
        self.refetch(now);
        Ok(())
    }

    pub fn save_profile<Tz: TimeZone>(
        &mut self,
        profile: &RiskProfile,
        now: &DateTime<Tz>,
    ) -> Result<RiskProfile, ApiError> {
        let saved = self.api.save_risk_profile(profile).map_err(|e| self.fail(e))?;
        self.state.dispatch(Action::SetProfile(Some(saved.clone())));
        self.refetch(now);
        Ok(saved)
    }

    pub fn analytics(&mut self, kind: AnalyticsKind) -> Result<Value, ApiError> {
        let v = self.api.analytics(kind).map_err(|e| self.fail(e))?;
        self.state.dispatch(Action::SetAnalytics(v.clone()));
        Ok(v)
    }

    /// Signs out: forgets the token, the cached data and the in-memory view.
    pub fn logout(mut self) -> Result<()> {
        self.api.set_token(None);
        config::clear_session(self.conn)?;
        cache::clear_user(self.conn, &self.user.id)?;
        self.state.dispatch(Action::Reset);
        info!(user = %self.user.id, "signed out");
        Ok(())
    }

    fn refetch<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        if let Err(e) = self.refresh(now) {
            warn!(user = %self.user.id, error = %e, "refetch after write failed");
            self.persist();
        }
    }

    fn fail(&mut self, e: ApiError) -> ApiError {
        if e.is_unauthorized() {
            self.api.set_token(None);
            if let Err(err) = config::clear_token(self.conn) {
                warn!(error = %err, "could not clear stored token");
            }
        }
        self.state.dispatch(Action::SetError(e.to_string()));
        e
    }

    fn persist(&self) {
        let uid = &self.user.id;
        write_cache(self.conn, uid, keys::TRANSACTIONS, &self.state.transactions);
        write_cache(self.conn, uid, keys::BALANCE, &self.state.balance);
        write_cache(self.conn, uid, keys::OBJECTIVES, &self.state.objectives);
        if let Some(p) = &self.state.profile {
            write_cache(self.conn, uid, keys::PROFILE, p);
        }
        if let Some(at) = &self.state.last_updated {
            write_cache(self.conn, uid, keys::LAST_SYNC, at);
        }
    }
}

fn read_cache<T: DeserializeOwned>(conn: &Connection, user_id: &str, key: &str) -> Option<T> {
    cache::get_json(conn, user_id, key).unwrap_or_else(|e| {
        warn!(user = user_id, key, error = %e, "ignoring unreadable cache entry");
        None
    })
}

fn write_cache<T: Serialize + ?Sized>(conn: &Connection, user_id: &str, key: &str, v: &T) {
    if let Err(e) = cache::put_json(conn, user_id, key, v) {
        warn!(user = user_id, key, error = %e, "could not write cache");
    }
}
