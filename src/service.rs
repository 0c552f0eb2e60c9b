//! Per-wallet unit of work: score, derive the loan cap, optionally persist.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::aggregator::RiskScoreAggregator;
use crate::loan::LoanCapPolicy;
use crate::sink::{ScoreRecord, ScoreSink};

pub struct ScoringService {
    aggregator: RiskScoreAggregator,
    policy: LoanCapPolicy,
    sink: Arc<dyn ScoreSink>,
}

impl ScoringService {
    pub fn new(aggregator: RiskScoreAggregator, policy: LoanCapPolicy, sink: Arc<dyn ScoreSink>) -> Self {
        Self {
            aggregator,
            policy,
            sink,
        }
    }

    pub fn aggregator(&self) -> &RiskScoreAggregator {
        &self.aggregator
    }

    /// Score + cap, nothing written.
    pub async fn assess(&self, wallet_address: &str) -> Result<ScoreRecord> {
        self.assess_at(wallet_address, Utc::now()).await
    }

    pub async fn assess_at(&self, wallet_address: &str, now: DateTime<Utc>) -> Result<ScoreRecord> {
        let result = self
            .aggregator
            .compute_score_at(wallet_address, now)
            .await
            .with_context(|| format!("scoring {wallet_address}"))?;
        let max_loan = self.policy.max_loan(&result);
        Ok(ScoreRecord::new(&result, max_loan))
    }

    /// Assess, then hand the record to the sink. A sink failure is returned
    /// to the caller; the record is not retried here.
    pub async fn refresh(&self, wallet_address: &str) -> Result<ScoreRecord> {
        self.refresh_at(wallet_address, Utc::now()).await
    }

    pub async fn refresh_at(&self, wallet_address: &str, now: DateTime<Utc>) -> Result<ScoreRecord> {
        let record = self.assess_at(wallet_address, now).await?;
        self.sink.persist(&record).await?;
        tracing::info!(
            wallet = %record.wallet_address,
            score = record.risk_score,
            max_loan = record.max_loan,
            sink = self.sink.name(),
            "score persisted"
        );
        Ok(record)
    }
}
