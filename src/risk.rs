// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stop-loss risk tiers and profile recommendations. Everything here is pure.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Ordered so that `Low < Medium < High < Critical`; `Undefined` sorts first
/// and means "no stop-loss configured".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Undefined,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    pub fn rank(&self) -> Option<u8> {
        match self {
            RiskTier::Undefined => None,
            RiskTier::Low => Some(0),
            RiskTier::Medium => Some(1),
            RiskTier::High => Some(2),
            RiskTier::Critical => Some(3),
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            RiskTier::Undefined => "NOT CONFIGURED",
            RiskTier::Low => "SAFE",
            RiskTier::Medium => "WATCH",
            RiskTier::High => "HIGH RISK",
            RiskTier::Critical => "STOP LOSS HIT",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            RiskTier::Undefined => "Configure a stop-loss to protect your bankroll",
            RiskTier::Low => "Within your limit; keep managing the bankroll",
            RiskTier::Medium => "Keep an eye on your losses",
            RiskTier::High => "Very close to the limit; consider stopping or reducing stakes",
            RiskTier::Critical => "Stop betting now",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskTier::Undefined => "undefined",
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        };
        f.write_str(s)
    }
}

fn ratio(tenths: i64) -> Decimal {
    Decimal::new(tenths, 1)
}

/// First match wins: 100% of the limit, then 90%, then 50%.
pub fn tier_for_loss(loss: Decimal, limit: Decimal) -> RiskTier {
    if limit <= Decimal::ZERO {
        return RiskTier::Undefined;
    }
    if loss >= limit {
        RiskTier::Critical
    } else if loss >= limit * ratio(9) {
        RiskTier::High
    } else if loss >= limit * ratio(5) {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

pub fn stop_loss_amount(initial: Decimal, pct: Decimal) -> Decimal {
    if initial <= Decimal::ZERO || pct <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    initial
        .checked_mul(pct)
        .map(|v| v / Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::MAX)
}

/// A gain never counts as a negative loss.
pub fn current_loss(initial: Decimal, current: Decimal) -> Decimal {
    initial.saturating_sub(current).max(Decimal::ZERO)
}

pub fn loss_percentage(initial: Decimal, current: Decimal) -> Decimal {
    if initial <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    current_loss(initial, current)
        .checked_div(initial)
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}

pub fn is_stop_loss_triggered(initial: Decimal, current: Decimal, pct: Decimal) -> bool {
    let limit = stop_loss_amount(initial, pct);
    limit > Decimal::ZERO && current_loss(initial, current) >= limit
}

/// `part / whole` as a percentage capped at 100; a quotient too large to
/// represent is already past the cap.
fn capped_pct(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|q| q.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ONE_HUNDRED, |p| p.min(Decimal::ONE_HUNDRED))
}

fn progress(loss: Decimal, limit: Decimal) -> Decimal {
    capped_pct(loss, limit)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub stop_loss_percentage: Decimal,
    pub stop_loss_amount: Decimal,
    pub current_loss: Decimal,
    pub loss_percentage: Decimal,
    /// Share of the stop-loss already consumed, capped at 100.
    pub progress: Decimal,
}

pub fn evaluate(initial: Decimal, current: Decimal, stop_loss_percentage: Decimal) -> RiskAssessment {
    let loss = current_loss(initial, current);
    let limit = stop_loss_amount(initial, stop_loss_percentage);
    let tier = if stop_loss_percentage <= Decimal::ZERO {
        RiskTier::Undefined
    } else {
        tier_for_loss(loss, limit)
    };
    RiskAssessment {
        tier,
        stop_loss_percentage,
        stop_loss_amount: limit,
        current_loss: loss,
        loss_percentage: loss_percentage(initial, current),
        progress: if tier == RiskTier::Undefined {
            Decimal::ZERO
        } else {
            progress(loss, limit)
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyStopLoss {
    pub tier: RiskTier,
    pub limit: Decimal,
    pub losses: Decimal,
    /// Headroom left before the limit; negative once exceeded.
    pub remaining: Decimal,
    pub triggered: bool,
    /// Less than 20% of the limit left, not yet triggered.
    pub near_limit: bool,
    pub progress: Decimal,
}

/// Today's losses against a monetary ceiling.
pub fn evaluate_daily(daily_losses: Decimal, stop_loss_value: Decimal) -> DailyStopLoss {
    if stop_loss_value <= Decimal::ZERO {
        return DailyStopLoss {
            tier: RiskTier::Undefined,
            limit: Decimal::ZERO,
            losses: daily_losses,
            remaining: Decimal::ZERO,
            triggered: false,
            near_limit: false,
            progress: Decimal::ZERO,
        };
    }
    let triggered = daily_losses >= stop_loss_value;
    let remaining = stop_loss_value.saturating_sub(daily_losses);
    DailyStopLoss {
        tier: tier_for_loss(daily_losses, stop_loss_value),
        limit: stop_loss_value,
        losses: daily_losses,
        remaining,
        triggered,
        near_limit: !triggered && remaining < stop_loss_value * ratio(2),
        progress: progress(daily_losses, stop_loss_value),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    pub posture: Posture,
    pub stop_loss_percentage: Decimal,
    pub profit_target_percentage: Decimal,
    pub max_bet_percentage: Decimal,
}

pub fn recommend(risk_level: u8) -> Recommendation {
    let (posture, sl, pt, mb) = match risk_level {
        0..=3 => (Posture::Conservative, 10, 25, 2),
        4..=6 => (Posture::Moderate, 20, 50, 5),
        _ => (Posture::Aggressive, 30, 100, 10),
    };
    Recommendation {
        posture,
        stop_loss_percentage: Decimal::from(sl),
        profit_target_percentage: Decimal::from(pt),
        max_bet_percentage: Decimal::from(mb),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Cautious,
    Balanced,
    HighRisk,
}

impl Preset {
    pub fn for_risk_level(risk_level: u8) -> Preset {
        match risk_level {
            0..=3 => Preset::Cautious,
            4..=6 => Preset::Balanced,
            _ => Preset::HighRisk,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Preset::Cautious => "cautious",
            Preset::Balanced => "balanced",
            Preset::HighRisk => "highrisk",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Preset::Cautious => "Cautious Player",
            Preset::Balanced => "Balanced Player",
            Preset::HighRisk => "High-Risk Player",
        }
    }

    pub fn recommended_stop_loss(&self) -> Decimal {
        match self {
            Preset::Cautious => Decimal::from(10),
            Preset::Balanced => Decimal::from(20),
            Preset::HighRisk => Decimal::from(30),
        }
    }

    pub fn recommended_profit_target(&self) -> Decimal {
        match self {
            Preset::Cautious => Decimal::from(20),
            Preset::Balanced => Decimal::from(40),
            Preset::HighRisk => Decimal::from(60),
        }
    }
}

/// `balance * risk_level%`.
pub fn daily_profit_target(current_balance: Decimal, risk_level: u8) -> Decimal {
    current_balance
        .saturating_mul(Decimal::from(risk_level))
        / Decimal::ONE_HUNDRED
}

pub fn daily_profit_progress(daily_gains: Decimal, target: Decimal) -> Decimal {
    capped_pct(daily_gains, target)
}
