//! # Loan cap policy
//! Pure mapping `RiskScoreResult → max loan (USD)`. No I/O, never fails.
//!
//! Policy: the score picks a base cap from fixed bands (step function, no
//! interpolation); internal repayment history then scales it. Any default
//! collapses the multiplier to 0.1 regardless of good loans; otherwise each
//! good loan adds 0.5.

use metrics::counter;

use crate::analysis::Signal;
use crate::providers::RepaymentHistory;
use crate::score::RiskScoreResult;

pub const DEFAULT_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_PENALTY_MULTIPLIER: f64 = 0.1;
pub const GOOD_LOAN_BONUS: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoanCapPolicy {
    /// Upper bound for the good-loan reward. `None` keeps it unbounded.
    pub multiplier_cap: Option<f64>,
}

impl LoanCapPolicy {
    pub fn with_multiplier_cap(cap: f64) -> Self {
        Self {
            multiplier_cap: Some(cap),
        }
    }

    pub fn multiplier(&self, history: RepaymentHistory) -> f64 {
        if history.defaulted_loans > 0 {
            return DEFAULT_PENALTY_MULTIPLIER;
        }
        if history.good_loans == 0 {
            return DEFAULT_MULTIPLIER;
        }
        let reward = DEFAULT_MULTIPLIER + GOOD_LOAN_BONUS * history.good_loans as f64;
        match self.multiplier_cap {
            Some(cap) => reward.min(cap.max(DEFAULT_MULTIPLIER)),
            None => reward,
        }
    }

    pub fn max_loan(&self, result: &RiskScoreResult) -> u64 {
        let history = RepaymentHistory::new(
            result.analysis.count(Signal::PlatformGoodLoans),
            result.analysis.count(Signal::PlatformDefaultedLoans),
        );
        let base = base_cap(result.score);
        let multiplier = self.multiplier(history);
        let cap = (base as f64 * multiplier).floor();

        counter!("loan_caps_computed_total").increment(1);
        tracing::debug!(
            wallet = %result.wallet_address,
            score = result.score,
            base,
            multiplier,
            cap,
            "loan cap"
        );
        // `as` saturates; the product is never negative.
        cap as u64
    }
}

/// Score band → base cap in USD.
pub fn base_cap(score: u16) -> u64 {
    match score {
        0..=399 => 50,
        400..=549 => 250,
        550..=699 => 1_000,
        _ => 5_000,
    }
}

/// Max loan under the default (unbounded) policy.
pub fn compute_max_loan(result: &RiskScoreResult) -> u64 {
    LoanCapPolicy::default().max_loan(result)
}
