// tests/loan_policy.rs
mod common;

use common::{now, WALLET};
use wallet_credit_score::loan::base_cap;
use wallet_credit_score::providers::RepaymentHistory;
use wallet_credit_score::{
    compute_max_loan, AnalysisBreakdown, LoanCapPolicy, RiskScoreResult, Signal, WalletAddress,
};

fn scored(score: u16, good: u64, defaulted: u64) -> RiskScoreResult {
    let analysis = AnalysisBreakdown::new()
        .with(Signal::PlatformGoodLoans, good as f64)
        .with(Signal::PlatformDefaultedLoans, defaulted as f64);
    let r = RiskScoreResult::from_total(
        WalletAddress::parse(WALLET).unwrap(),
        f64::from(score) - 300.0,
        now(),
        analysis,
    );
    assert_eq!(r.score, score);
    r
}

#[test]
fn band_edges() {
    assert_eq!(base_cap(0), base_cap(399));
    assert_eq!(base_cap(399), 50);
    assert_eq!(base_cap(550), base_cap(699));
    assert_eq!(base_cap(550), 1_000);
    assert_eq!(base_cap(700), base_cap(850));
    assert_eq!(base_cap(700), 5_000);
}

#[test]
fn caps_across_the_score_range() {
    let cases = [
        (300, 0, 0, 50),
        (400, 0, 0, 250),
        (549, 1, 0, 375),
        (550, 0, 0, 1_000),
        (600, 2, 0, 2_000),
        (700, 0, 0, 5_000),
        (850, 4, 0, 15_000),
        (850, 5, 1, 500),
        (420, 0, 2, 25),
    ];
    for (score, good, defaulted, expected) in cases {
        assert_eq!(
            compute_max_loan(&scored(score, good, defaulted)),
            expected,
            "score={score} good={good} defaulted={defaulted}"
        );
    }
}

#[test]
fn one_default_beats_any_number_of_good_loans() {
    let p = LoanCapPolicy::default();
    assert_eq!(p.multiplier(RepaymentHistory::new(5, 1)), 0.1);
    assert_eq!(p.multiplier(RepaymentHistory::new(500, 1)), 0.1);
}

#[test]
fn capped_policy_limits_large_histories() {
    let p = LoanCapPolicy::with_multiplier_cap(2.5);
    assert_eq!(p.max_loan(&scored(720, 10, 0)), 12_500);
    assert_eq!(LoanCapPolicy::default().max_loan(&scored(720, 10, 0)), 30_000);
}
