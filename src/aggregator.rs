//! # Risk Score Aggregator
//! Fuses platform history and on-chain signals into a bounded score.
//!
//! Order of work per call:
//! 1) validate the address (no I/O before this succeeds)
//! 2) chain connectivity check
//! 3) platform history → 4) balance → 5) transactions → 6) token variety
//! 7) clamp + round, derive risk level
//!
//! All-or-nothing: the first provider error aborts the call. The one valid
//! "empty" outcome is a wallet without transaction history.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};

use crate::address::WalletAddress;
use crate::analysis::{AnalysisBreakdown, Signal};
use crate::error::ScoreResult;
use crate::providers::ScoreProviders;
use crate::score::RiskScoreResult;
use crate::weights::ScoreWeights;

/// Hard ceiling on what balance alone can add.
pub const BALANCE_CONTRIBUTION_CAP: f64 = 200.0;

pub const NO_HISTORY_NOTE: &str = "New wallet with no transaction history.";

pub struct RiskScoreAggregator {
    weights: ScoreWeights,
    providers: ScoreProviders,
}

impl RiskScoreAggregator {
    pub fn new(weights: ScoreWeights, providers: ScoreProviders) -> Self {
        crate::metrics::ensure_metrics_described();
        Self { weights, providers }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub async fn compute_score(&self, wallet_address: &str) -> ScoreResult<RiskScoreResult> {
        self.compute_score_at(wallet_address, Utc::now()).await
    }

    /// Same as [`compute_score`](Self::compute_score) with an explicit clock,
    /// so identical inputs give identical output.
    pub async fn compute_score_at(
        &self,
        wallet_address: &str,
        now: DateTime<Utc>,
    ) -> ScoreResult<RiskScoreResult> {
        counter!("scoring_requests_total").increment(1);
        let t0 = std::time::Instant::now();

        let out = self.run(wallet_address, now).await;

        histogram!("scoring_duration_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        match &out {
            Ok(r) => {
                histogram!("risk_score_value").record(f64::from(r.score));
                tracing::info!(
                    wallet = %r.wallet_address,
                    score = r.score,
                    risk_level = r.risk_level.as_str(),
                    "risk score computed"
                );
            }
            Err(e) => {
                counter!("scoring_failures_total", "kind" => e.kind()).increment(1);
                tracing::warn!(input = wallet_address, error = %e, "risk score failed");
            }
        }
        out
    }

    async fn run(&self, input: &str, now: DateTime<Utc>) -> ScoreResult<RiskScoreResult> {
        let wallet = WalletAddress::parse(input)?;
        let w = &self.weights;
        let p = &self.providers;

        p.balances.check_connection().await?;

        let mut analysis = AnalysisBreakdown::new();

        // Platform history
        let history = p.history.repayment_history(&wallet).await?;
        let platform_score = history.good_loans as f64 * w.platform_repayment_good
            + history.defaulted_loans as f64 * w.platform_repayment_bad;
        analysis.record(Signal::PlatformGoodLoans, history.good_loans as f64);
        analysis.record(Signal::PlatformDefaultedLoans, history.defaulted_loans as f64);
        analysis.record(Signal::PlatformScore, platform_score);
        tracing::debug!(wallet = %wallet, platform_score, "platform history weighed");

        // Native balance
        let balance = p.balances.native_balance(&wallet).await?;
        let balance_score = balance_contribution(balance, w.eth_balance);
        analysis.record(Signal::EthBalance, balance);
        analysis.record(Signal::BalanceScore, balance_score);
        tracing::debug!(wallet = %wallet, balance, balance_score, "balance weighed");

        // Age + activity
        let txs = p.transactions.transactions(&wallet).await?;
        let (age_days, tx_count) = match txs.iter().map(|t| t.timestamp).min() {
            Some(first) => (wallet_age_days(first, now), txs.len() as u64),
            None => {
                analysis.set_note(NO_HISTORY_NOTE);
                (0, 0)
            }
        };
        let age_score = age_days as f64 * w.wallet_age_days;
        let tx_score = tx_count as f64 * w.tx_count;
        analysis.record(Signal::WalletAgeDays, age_days as f64);
        analysis.record(Signal::AgeScore, age_score);
        analysis.record(Signal::TransactionCount, tx_count as f64);
        analysis.record(Signal::TxScore, tx_score);
        tracing::debug!(wallet = %wallet, age_days, tx_count, "activity weighed");

        // Token variety
        let transfers = p.tokens.token_transfers(&wallet).await?;
        let distinct: BTreeSet<&str> = transfers.iter().map(|t| t.token_symbol.as_str()).collect();
        let token_score = distinct.len() as f64 * w.erc20_token_count;
        analysis.record(Signal::Erc20TokenVarietyCount, distinct.len() as f64);
        analysis.record(Signal::TokenScore, token_score);
        tracing::debug!(wallet = %wallet, tokens = distinct.len(), "token variety weighed");

        let total = analysis.total_contribution();
        Ok(RiskScoreResult::from_total(wallet, total, now, analysis))
    }
}

/// `min(balance × weight, 200)`.
pub fn balance_contribution(balance: f64, weight: f64) -> f64 {
    (balance * weight).min(BALANCE_CONTRIBUTION_CAP)
}

/// Whole days since the first transaction; a first transaction in the
/// future (clock skew) counts as age 0.
pub fn wallet_age_days(first_tx: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let days = (now - first_tx).num_days();
    u64::try_from(days).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn balance_is_capped() {
        assert_eq!(balance_contribution(3.0, 50.0), 150.0);
        assert_eq!(balance_contribution(4.0, 50.0), 200.0);
        assert_eq!(balance_contribution(10.0, 50.0), 200.0);
        assert_eq!(balance_contribution(0.0, 50.0), 0.0);
    }

    #[test]
    fn wallet_age_floors_whole_days() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(wallet_age_days(now - Duration::hours(47), now), 1);
        assert_eq!(wallet_age_days(now - Duration::days(365), now), 365);
        assert_eq!(wallet_age_days(now, now), 0);
        assert_eq!(wallet_age_days(now + Duration::days(3), now), 0);
    }
}
