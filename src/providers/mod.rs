// src/providers/mod.rs
//! Data sources the aggregator reads from. Each is a trait object so the
//! aggregator can be wired with real clients in production and fakes in tests.

pub mod etherscan;
pub mod rpc;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::WalletAddress;
use crate::error::ScoreResult;

/// Internal platform repayment counters for one wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentHistory {
    pub good_loans: u64,
    pub defaulted_loans: u64,
}

impl RepaymentHistory {
    pub fn new(good_loans: u64, defaulted_loans: u64) -> Self {
        Self {
            good_loans,
            defaulted_loans,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub token_symbol: String,
    pub contract_address: String,
}

#[async_trait]
pub trait PlatformHistoryProvider: Send + Sync {
    async fn repayment_history(&self, wallet: &WalletAddress) -> ScoreResult<RepaymentHistory>;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Fails with `ProviderUnavailable` when the chain cannot be reached at all.
    async fn check_connection(&self) -> ScoreResult<()> {
        Ok(())
    }
    /// Native balance in major units (ether, not wei).
    async fn native_balance(&self, wallet: &WalletAddress) -> ScoreResult<f64>;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait TransactionProvider: Send + Sync {
    /// Ascending by time; empty for a wallet with no history.
    async fn transactions(&self, wallet: &WalletAddress) -> ScoreResult<Vec<Transaction>>;
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait TokenActivityProvider: Send + Sync {
    async fn token_transfers(&self, wallet: &WalletAddress) -> ScoreResult<Vec<TokenTransfer>>;
    fn name(&self) -> &'static str;
}

/// The four sources an aggregator is built from.
#[derive(Clone)]
pub struct ScoreProviders {
    pub history: Arc<dyn PlatformHistoryProvider>,
    pub balances: Arc<dyn BalanceProvider>,
    pub transactions: Arc<dyn TransactionProvider>,
    pub tokens: Arc<dyn TokenActivityProvider>,
}

/// Fixed counters. Stands in for the ledger when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticHistoryProvider {
    history: RepaymentHistory,
}

impl StaticHistoryProvider {
    pub fn new(good_loans: u64, defaulted_loans: u64) -> Self {
        Self {
            history: RepaymentHistory::new(good_loans, defaulted_loans),
        }
    }
}

#[async_trait]
impl PlatformHistoryProvider for StaticHistoryProvider {
    async fn repayment_history(&self, wallet: &WalletAddress) -> ScoreResult<RepaymentHistory> {
        tracing::debug!(wallet = %wallet, "static repayment history");
        Ok(self.history)
    }

    fn name(&self) -> &'static str {
        "static-history"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_history_defaults_to_zero() {
        let w = WalletAddress::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        let h = StaticHistoryProvider::default()
            .repayment_history(&w)
            .await
            .unwrap();
        assert_eq!(h, RepaymentHistory::new(0, 0));

        let h = StaticHistoryProvider::new(3, 1)
            .repayment_history(&w)
            .await
            .unwrap();
        assert_eq!(h.good_loans, 3);
        assert_eq!(h.defaulted_loans, 1);
    }
}
