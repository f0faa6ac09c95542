// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Deposit,
    Withdraw,
    Gains,
    Losses,
}

impl TxType {
    pub const ALL: [TxType; 4] = [
        TxType::Deposit,
        TxType::Withdraw,
        TxType::Gains,
        TxType::Losses,
    ];

    /// Exact, case-sensitive match on the wire tag.
    pub fn parse(s: &str) -> Option<TxType> {
        match s {
            "deposit" => Some(TxType::Deposit),
            "withdraw" => Some(TxType::Withdraw),
            "gains" => Some(TxType::Gains),
            "losses" => Some(TxType::Losses),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Deposit => "deposit",
            TxType::Withdraw => "withdraw",
            TxType::Gains => "gains",
            TxType::Losses => "losses",
        }
    }

    /// `deposit` and `gains` raise the balance.
    pub fn is_credit(&self) -> bool {
        matches!(self, TxType::Deposit | TxType::Gains)
    }

    pub fn signed(&self, amount: Decimal) -> Decimal {
        if self.is_credit() { amount } else { -amount }
    }

    pub fn default_description(&self) -> &'static str {
        match self {
            TxType::Deposit => "Bank deposit",
            TxType::Withdraw => "Bank withdrawal",
            TxType::Gains => "Operation gains",
            TxType::Losses => "Operation losses",
        }
    }

    pub fn default_category(&self) -> &'static str {
        match self {
            TxType::Deposit => "Deposit",
            TxType::Withdraw => "Withdrawal",
            TxType::Gains => "Gains",
            TxType::Losses => "Losses",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized ledger entry. `amount` is never negative; direction comes from `r#type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub r#type: TxType,
    pub amount: Decimal,
    pub date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_initial_bank: bool,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        self.r#type.signed(self.amount)
    }

    /// Server creation time when known, otherwise the logical date.
    pub fn timeline_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.date)
    }
}

/// What the user submits for create/update, before the server assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDraft {
    pub r#type: TxType,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "isInitialBank")]
    pub is_initial_bank: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub current: Decimal,
    pub initial: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub gains: Decimal,
    pub losses: Decimal,
    pub last_reset: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyHistoryEntry {
    pub date: DateTime<Utc>,
    pub gains: Decimal,
    pub losses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub id: Option<String>,
    pub profile_type: Option<String>,
    pub risk_level: u8,
    pub initial_balance: Decimal,
    pub stop_loss_percentage: Decimal,
    /// Monetary stop-loss ceiling used by the daily check.
    pub stop_loss: Decimal,
    pub profit_target: Decimal,
}

impl Default for RiskProfile {
    fn default() -> Self {
        RiskProfile {
            id: None,
            profile_type: None,
            risk_level: 5,
            initial_balance: Decimal::ZERO,
            stop_loss_percentage: Decimal::ZERO,
            stop_loss: Decimal::ZERO,
            profit_target: Decimal::ZERO,
        }
    }
}

impl RiskProfile {
    /// 0 means "not set"; 100 and above is meaningless as a loss ceiling.
    pub fn is_configured(&self) -> bool {
        self.stop_loss_percentage > Decimal::ZERO && self.stop_loss_percentage < Decimal::ONE_HUNDRED
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub target_date: Option<NaiveDate>,
    pub category: Option<String>,
}

impl Objective {
    pub fn is_complete(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    pub fn progress(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ONE_HUNDRED;
        }
        (self.current_amount / self.target_amount * Decimal::ONE_HUNDRED)
            .min(Decimal::ONE_HUNDRED)
            .max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveDraft {
    pub title: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub target_date: Option<NaiveDate>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}
