// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Daily gains/losses counters with calendar-day rollover.
//!
//! The counters are [`ResetState::Current`] while the local date of
//! `last_reset` equals today's local date and [`ResetState::Stale`] once the
//! day has advanced. A stale check archives the previous day (bounded to
//! [`HISTORY_CAP`] entries), zeroes the counters and stamps `last_reset`.
//! Counters are also rebuilt from the transaction list on every refresh, so
//! the zeroing only matters between midnight and the next refresh.

use crate::models::{DailyHistoryEntry, DailyTotals, Transaction, TxType};
use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const HISTORY_CAP: usize = 90;
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetState {
    Current,
    Stale,
}

impl DailyTotals {
    pub fn state_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ResetState {
        match self.last_reset {
            Some(last) if last.with_timezone(&now.timezone()).date_naive() == now.date_naive() => {
                ResetState::Current
            }
            _ => ResetState::Stale,
        }
    }

    /// Zeroes the counters and stamps `now`. Returns the archived previous day,
    /// if there was one.
    pub fn roll_over<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Option<DailyHistoryEntry> {
        let archived = self.last_reset.map(|date| DailyHistoryEntry {
            date,
            gains: self.gains,
            losses: self.losses,
        });
        self.gains = Decimal::ZERO;
        self.losses = Decimal::ZERO;
        self.last_reset = Some(now.with_timezone(&Utc));
        archived
    }

    /// Rebuilds today's counters from scratch; records with no date are ignored.
    pub fn recompute<Tz: TimeZone>(&mut self, txs: &[Transaction], now: &DateTime<Tz>) {
        let tz = now.timezone();
        let today = now.date_naive();
        let mut gains = Decimal::ZERO;
        let mut losses = Decimal::ZERO;
        for tx in txs {
            let Some(date) = tx.date else { continue };
            if date.with_timezone(&tz).date_naive() != today {
                continue;
            }
            match tx.r#type {
                TxType::Gains => gains += tx.amount,
                TxType::Losses => losses += tx.amount,
                _ => {}
            }
        }
        self.gains = gains;
        self.losses = losses;
    }
}

/// Append-only, oldest evicted first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyHistory {
    entries: VecDeque<DailyHistoryEntry>,
}

impl DailyHistory {
    pub fn from_entries(entries: Vec<DailyHistoryEntry>) -> Self {
        let mut h = DailyHistory::default();
        for e in entries {
            h.push(e);
        }
        h
    }

    pub fn push(&mut self, entry: DailyHistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > HISTORY_CAP {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &DailyHistoryEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&DailyHistoryEntry> {
        self.entries.back()
    }
}

/// Durable home of one user's counters and history.
pub trait DailyStore {
    fn load_totals(&self, user_id: &str) -> Result<Option<DailyTotals>>;
    fn save_totals(&self, user_id: &str, totals: &DailyTotals) -> Result<()>;
    fn load_history(&self, user_id: &str) -> Result<Vec<DailyHistoryEntry>>;
    fn append_history(&self, user_id: &str, entry: &DailyHistoryEntry, cap: usize) -> Result<()>;
}

impl<T: DailyStore + ?Sized> DailyStore for &T {
    fn load_totals(&self, user_id: &str) -> Result<Option<DailyTotals>> {
        (**self).load_totals(user_id)
    }
    fn save_totals(&self, user_id: &str, totals: &DailyTotals) -> Result<()> {
        (**self).save_totals(user_id, totals)
    }
    fn load_history(&self, user_id: &str) -> Result<Vec<DailyHistoryEntry>> {
        (**self).load_history(user_id)
    }
    fn append_history(&self, user_id: &str, entry: &DailyHistoryEntry, cap: usize) -> Result<()> {
        (**self).append_history(user_id, entry, cap)
    }
}

/// Process-local store, for sessions that have no database.
#[derive(Debug, Default)]
pub struct MemoryDailyStore {
    inner: Mutex<Vec<(String, Option<DailyTotals>, Vec<DailyHistoryEntry>)>>,
}

impl MemoryDailyStore {
    fn with_user<R>(&self, user_id: &str, f: impl FnOnce(&mut Option<DailyTotals>, &mut Vec<DailyHistoryEntry>) -> R) -> Result<R> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("daily store lock poisoned"))?;
        let pos = match guard.iter().position(|(u, _, _)| u == user_id) {
            Some(p) => p,
            None => {
                guard.push((user_id.to_string(), None, Vec::new()));
                guard.len() - 1
            }
        };
        let (_, totals, history) = &mut guard[pos];
        Ok(f(totals, history))
    }
}

impl DailyStore for MemoryDailyStore {
    fn load_totals(&self, user_id: &str) -> Result<Option<DailyTotals>> {
        self.with_user(user_id, |t, _| t.clone())
    }
    fn save_totals(&self, user_id: &str, totals: &DailyTotals) -> Result<()> {
        self.with_user(user_id, |t, _| *t = Some(totals.clone()))
    }
    fn load_history(&self, user_id: &str) -> Result<Vec<DailyHistoryEntry>> {
        self.with_user(user_id, |_, h| h.clone())
    }
    fn append_history(&self, user_id: &str, entry: &DailyHistoryEntry, cap: usize) -> Result<()> {
        self.with_user(user_id, |_, h| {
            h.push(entry.clone());
            if h.len() > cap {
                let excess = h.len() - cap;
                h.drain(..excess);
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rollover {
    pub archived: Option<DailyHistoryEntry>,
    pub reset_at: DateTime<Utc>,
}

/// One user's daily counters, mirrored into a [`DailyStore`].
///
/// Persistence failures are logged and swallowed: in-memory state stays
/// authoritative for the rest of the session.
pub struct ResetTracker<S: DailyStore> {
    user_id: String,
    store: S,
    totals: DailyTotals,
    history: DailyHistory,
}

impl<S: DailyStore> ResetTracker<S> {
    /// Loads persisted state (or starts fresh) and runs the start-up rollover check.
    pub fn start<Tz: TimeZone>(user_id: &str, store: S, now: &DateTime<Tz>) -> Self {
        let totals = store.load_totals(user_id).unwrap_or_else(|e| {
            warn!(user = user_id, error = %e, "could not load daily totals, starting fresh");
            None
        });
        let history = store.load_history(user_id).unwrap_or_else(|e| {
            warn!(user = user_id, error = %e, "could not load daily history");
            Vec::new()
        });
        let mut tracker = ResetTracker {
            user_id: user_id.to_string(),
            store,
            totals: totals.unwrap_or_default(),
            history: DailyHistory::from_entries(history),
        };
        tracker.check(now);
        tracker
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn totals(&self) -> &DailyTotals {
        &self.totals
    }

    pub fn history(&self) -> &DailyHistory {
        &self.history
    }

    pub fn state<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ResetState {
        self.totals.state_at(now)
    }

    /// STALE -> CURRENT transition; `None` when today's counters are already current.
    pub fn check<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Option<Rollover> {
        if self.totals.state_at(now) == ResetState::Current {
            debug!(user = %self.user_id, "daily totals current");
            return None;
        }
        let archived = self.totals.roll_over(now);
        if let Some(entry) = &archived {
            self.history.push(entry.clone());
            if let Err(e) = self.store.append_history(&self.user_id, entry, HISTORY_CAP) {
                warn!(user = %self.user_id, error = %e, "could not archive daily totals");
            }
        }
        self.persist();
        let reset_at = self.totals.last_reset.unwrap_or_else(|| now.with_timezone(&Utc));
        info!(user = %self.user_id, %reset_at, archived = archived.is_some(), "daily totals reset");
        Some(Rollover { archived, reset_at })
    }

    /// Rebuilds today's counters from a fresh transaction snapshot.
    pub fn recompute<Tz: TimeZone>(&mut self, txs: &[Transaction], now: &DateTime<Tz>) {
        self.check(now);
        self.totals.recompute(txs, now);
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.store.save_totals(&self.user_id, &self.totals) {
            warn!(user = %self.user_id, error = %e, "could not persist daily totals");
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// Periodic task bound to its owner's lifetime: dropping (or cancelling) the
/// timer stops the thread and waits for it.
pub struct ResetTimer {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ResetTimer {
    pub fn spawn<F>(interval: Duration, mut tick: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("daily-reset".into())
            .spawn(move || {
                loop {
                    match rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => tick(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("daily reset timer stopped");
            })?;
        Ok(ResetTimer {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("daily reset timer thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for ResetTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
