// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod address;
pub mod aggregator;
pub mod analysis;
pub mod config;
pub mod error;
pub mod ledger;
pub mod loan;
pub mod metrics;
pub mod providers;
pub mod score;
pub mod service;
pub mod sink;
pub mod telemetry;
pub mod weights;

// ---- Re-exports for stable public API ----
pub use crate::address::WalletAddress;
pub use crate::aggregator::RiskScoreAggregator;
pub use crate::analysis::{AnalysisBreakdown, Signal};
pub use crate::config::EngineConfig;
pub use crate::error::{ScoreError, ScoreResult};
pub use crate::loan::{compute_max_loan, LoanCapPolicy};
pub use crate::providers::ScoreProviders;
pub use crate::score::{RiskLevel, RiskScoreResult};
pub use crate::service::ScoringService;
pub use crate::sink::{MemoryScoreSink, ScoreRecord, ScoreSink};
pub use crate::weights::ScoreWeights;
