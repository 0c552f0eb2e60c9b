// src/config/mod.rs
//! Process configuration from environment variables (a `.env` file is loaded
//! by the binary before this runs) plus builders for the real providers.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};

use crate::aggregator::RiskScoreAggregator;
use crate::ledger::LedgerClient;
use crate::providers::etherscan::{EtherscanClient, DEFAULT_ETHERSCAN_API_URL};
use crate::providers::rpc::RpcBalanceProvider;
use crate::providers::{PlatformHistoryProvider, ScoreProviders, StaticHistoryProvider};
use crate::sink::{MemoryScoreSink, ScoreSink};
use crate::weights::ScoreWeights;

pub const ENV_RPC_ENDPOINT: &str = "ETH_RPC_ENDPOINT";
pub const ENV_ETHERSCAN_API_KEY: &str = "ETHERSCAN_API_KEY";
pub const ENV_ETHERSCAN_API_URL: &str = "ETHERSCAN_API_URL";
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_SERVICE_KEY: &str = "SUPABASE_SERVICE_KEY";
pub const ENV_PROVIDER_TIMEOUT_MS: &str = "PROVIDER_TIMEOUT_MS";

pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub rpc_endpoint: String,
    pub etherscan_api_key: String,
    pub etherscan_api_url: String,
    /// `None` when the Supabase pair is not set; history then reads as (0, 0).
    pub ledger: Option<LedgerConfig>,
    pub provider_timeout: Duration,
    pub weights: ScoreWeights,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let rpc_endpoint = required(ENV_RPC_ENDPOINT)?;
        check_url(ENV_RPC_ENDPOINT, &rpc_endpoint)?;

        let etherscan_api_key = required(ENV_ETHERSCAN_API_KEY)?;
        let etherscan_api_url =
            optional(ENV_ETHERSCAN_API_URL).unwrap_or_else(|| DEFAULT_ETHERSCAN_API_URL.to_string());
        check_url(ENV_ETHERSCAN_API_URL, &etherscan_api_url)?;

        let ledger = match (optional(ENV_SUPABASE_URL), optional(ENV_SUPABASE_SERVICE_KEY)) {
            (Some(url), Some(service_key)) => {
                check_url(ENV_SUPABASE_URL, &url)?;
                Some(LedgerConfig { url, service_key })
            }
            (None, None) => None,
            (Some(_), None) => bail!("{ENV_SUPABASE_URL} is set but {ENV_SUPABASE_SERVICE_KEY} is missing"),
            (None, Some(_)) => bail!("{ENV_SUPABASE_SERVICE_KEY} is set but {ENV_SUPABASE_URL} is missing"),
        };

        let timeout_ms = match optional(ENV_PROVIDER_TIMEOUT_MS) {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| anyhow!("{ENV_PROVIDER_TIMEOUT_MS} must be a positive integer, got {raw:?}"))?,
            None => DEFAULT_PROVIDER_TIMEOUT_MS,
        };

        let weights = ScoreWeights::load_default()?;

        Ok(Self {
            rpc_endpoint,
            etherscan_api_key,
            etherscan_api_url,
            ledger,
            provider_timeout: Duration::from_millis(timeout_ms),
            weights,
        })
    }

    fn ledger_client(&self) -> Result<Option<LedgerClient>> {
        self.ledger
            .as_ref()
            .map(|l| LedgerClient::new(&l.url, l.service_key.clone(), self.provider_timeout))
            .transpose()
    }

    /// RPC balance, explorer for both activity traits, ledger (or the
    /// static (0, 0) stand-in) for history.
    pub fn build_providers(&self) -> Result<ScoreProviders> {
        let rpc = RpcBalanceProvider::new(&self.rpc_endpoint, self.provider_timeout)?;
        let explorer = Arc::new(EtherscanClient::new(
            self.etherscan_api_url.clone(),
            self.etherscan_api_key.clone(),
            self.provider_timeout,
        )?);
        let history: Arc<dyn PlatformHistoryProvider> = match self.ledger_client()? {
            Some(ledger) => Arc::new(ledger),
            None => {
                tracing::info!("no ledger configured, platform history fixed at zero");
                Arc::new(StaticHistoryProvider::default())
            }
        };
        Ok(ScoreProviders {
            history,
            balances: Arc::new(rpc),
            transactions: explorer.clone(),
            tokens: explorer,
        })
    }

    pub fn build_aggregator(&self) -> Result<RiskScoreAggregator> {
        Ok(RiskScoreAggregator::new(self.weights, self.build_providers()?))
    }

    /// Ledger when configured, otherwise an in-memory sink.
    pub fn build_sink(&self) -> Result<Arc<dyn ScoreSink>> {
        Ok(match self.ledger_client()? {
            Some(ledger) => Arc::new(ledger),
            None => Arc::new(MemoryScoreSink::new()),
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| anyhow!("missing required env var {key}"))
}

fn check_url(key: &str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        bail!("{key} must start with http:// or https://, got {value:?}")
    }
}
