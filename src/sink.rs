//! Where finished scores go. The engine never writes on its own; a caller
//! hands a [`ScoreRecord`] to whichever sink it was wired with.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::score::{RiskLevel, RiskScoreResult};

/// Row-shaped summary of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub wallet_address: String,
    pub risk_score: u16,
    pub risk_level: RiskLevel,
    pub max_loan: u64,
    pub last_updated: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn new(result: &RiskScoreResult, max_loan: u64) -> Self {
        Self {
            wallet_address: result.wallet_address.to_string(),
            risk_score: result.score,
            risk_level: result.risk_level,
            max_loan,
            last_updated: result.computed_at,
        }
    }
}

#[async_trait]
pub trait ScoreSink: Send + Sync {
    async fn persist(&self, record: &ScoreRecord) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Keeps everything in memory. Used where no real store is wanted.
#[derive(Debug, Default)]
pub struct MemoryScoreSink {
    records: Mutex<Vec<ScoreRecord>>,
}

impl MemoryScoreSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<ScoreRecord> {
        self.records.lock().await.clone()
    }

    /// Most recent record for a wallet, if any.
    pub async fn latest_for(&self, wallet_address: &str) -> Option<ScoreRecord> {
        self.records
            .lock()
            .await
            .iter()
            .rev()
            .find(|r| r.wallet_address == wallet_address)
            .cloned()
    }
}

#[async_trait]
impl ScoreSink for MemoryScoreSink {
    async fn persist(&self, record: &ScoreRecord) -> Result<()> {
        tracing::debug!(wallet = %record.wallet_address, score = record.risk_score, "memory sink write");
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::WalletAddress;
    use crate::analysis::AnalysisBreakdown;
    use chrono::TimeZone;

    fn result(score_total: f64) -> RiskScoreResult {
        RiskScoreResult::from_total(
            WalletAddress::parse("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359").unwrap(),
            score_total,
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            AnalysisBreakdown::new(),
        )
    }

    #[tokio::test]
    async fn memory_sink_keeps_latest_per_wallet() {
        let sink = MemoryScoreSink::new();
        sink.persist(&ScoreRecord::new(&result(100.0), 50)).await.unwrap();
        sink.persist(&ScoreRecord::new(&result(420.0), 5000)).await.unwrap();

        assert_eq!(sink.records().await.len(), 2);
        let latest = sink
            .latest_for("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359")
            .await
            .unwrap();
        assert_eq!(latest.risk_score, 720);
        assert_eq!(latest.risk_level, RiskLevel::Low);
        assert_eq!(latest.max_loan, 5000);
        assert!(sink.latest_for("0x0").await.is_none());
    }

    #[test]
    fn record_serializes_row_shape() {
        let v = serde_json::to_value(ScoreRecord::new(&result(0.0), 50)).unwrap();
        assert_eq!(v["risk_score"], serde_json::json!(300));
        assert_eq!(v["risk_level"], serde_json::json!("high"));
        assert_eq!(v["max_loan"], serde_json::json!(50));
        assert_eq!(v["last_updated"], serde_json::json!("2025-01-02T03:04:05Z"));
    }
}
