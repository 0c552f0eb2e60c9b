//! # Risk score
//! Output of the aggregator plus the pure mappings it relies on:
//! weighted total → bounded integer score → risk level.
//!
//! The 300 floor and 850 ceiling are fixed policy, independent of weights.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::address::WalletAddress;
use crate::analysis::AnalysisBreakdown;

pub const SCORE_FLOOR: u16 = 300;
pub const SCORE_CEILING: u16 = 850;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Boundaries belong to the riskier band: 700 is medium, 550 is high.
    pub fn from_score(score: u16) -> Self {
        if score > 700 {
            RiskLevel::Low
        } else if score > 550 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScoreResult {
    pub wallet_address: WalletAddress,
    pub score: u16,
    pub risk_level: RiskLevel,
    pub computed_at: DateTime<Utc>,
    pub analysis: AnalysisBreakdown,
}

impl RiskScoreResult {
    /// Builds the result from the weighted total; `score` and `risk_level`
    /// are derived here and nowhere else.
    pub fn from_total(
        wallet_address: WalletAddress,
        total: f64,
        computed_at: DateTime<Utc>,
        analysis: AnalysisBreakdown,
    ) -> Self {
        let score = final_score(total);
        Self {
            wallet_address,
            score,
            risk_level: RiskLevel::from_score(score),
            computed_at,
            analysis,
        }
    }
}

/// `round(clamp(300 + total, 300, 850))`, ties to even.
/// A NaN total (only reachable with pathological weights) lands on the floor.
pub fn final_score(total: f64) -> u16 {
    let floor = f64::from(SCORE_FLOOR);
    let ceiling = f64::from(SCORE_CEILING);
    let raw = floor + total;
    if raw.is_nan() {
        return SCORE_FLOOR;
    }
    raw.clamp(floor, ceiling).round_ties_even() as u16
}
