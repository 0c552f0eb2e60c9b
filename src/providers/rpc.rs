//! Native balance over JSON-RPC (`eth_chainId`, `eth_getBalance`).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider, ProviderError};
use ethers::types::U256;
use ethers::utils::format_units;
use metrics::histogram;

use super::BalanceProvider;
use crate::address::WalletAddress;
use crate::error::{ScoreError, ScoreResult};

const NAME: &str = "eth-rpc";

pub struct RpcBalanceProvider {
    provider: Provider<Http>,
    timeout: Duration,
}

impl RpcBalanceProvider {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .with_context(|| format!("building JSON-RPC provider for {rpc_url}"))?;
        Ok(Self { provider, timeout })
    }
}

fn is_connect_error(err: &ProviderError) -> bool {
    matches!(err, ProviderError::HTTPError(e) if e.is_connect())
}

/// wei → ether as f64. Balances beyond f64 precision lose low digits, which
/// the capped balance contribution never sees.
pub fn wei_to_ether(wei: U256) -> ScoreResult<f64> {
    let text = format_units(wei, "ether").map_err(|e| ScoreError::fetch(NAME, e))?;
    text.parse::<f64>()
        .map_err(|e| ScoreError::fetch(NAME, format!("unparsable balance {text:?}: {e}")))
}

#[async_trait]
impl BalanceProvider for RpcBalanceProvider {
    async fn check_connection(&self) -> ScoreResult<()> {
        match tokio::time::timeout(self.timeout, self.provider.get_chainid()).await {
            Ok(Ok(chain_id)) => {
                tracing::debug!(%chain_id, "rpc reachable");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, provider = NAME, "rpc connection check failed");
                Err(ScoreError::unavailable(NAME, e))
            }
            Err(_) => Err(ScoreError::unavailable(
                NAME,
                format!("no answer within {:?}", self.timeout),
            )),
        }
    }

    async fn native_balance(&self, wallet: &WalletAddress) -> ScoreResult<f64> {
        let t0 = std::time::Instant::now();
        let wei = match tokio::time::timeout(
            self.timeout,
            self.provider.get_balance(wallet.as_address(), None),
        )
        .await
        {
            Ok(Ok(wei)) => wei,
            Ok(Err(e)) if is_connect_error(&e) => return Err(ScoreError::unavailable(NAME, e)),
            Ok(Err(e)) => return Err(ScoreError::fetch(NAME, e)),
            Err(_) => {
                return Err(ScoreError::fetch(
                    NAME,
                    format!("eth_getBalance timed out after {:?}", self.timeout),
                ))
            }
        };
        histogram!("provider_call_ms", "provider" => NAME)
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        wei_to_ether(wei)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_wei_to_ether() {
        let three_eth = U256::from(3u64) * U256::exp10(18);
        assert_eq!(wei_to_ether(three_eth).unwrap(), 3.0);

        let half = U256::from(5u64) * U256::exp10(17);
        assert_eq!(wei_to_ether(half).unwrap(), 0.5);

        assert_eq!(wei_to_ether(U256::zero()).unwrap(), 0.0);
    }

    #[test]
    fn rejects_bad_rpc_url() {
        assert!(RpcBalanceProvider::new("not a url", Duration::from_secs(1)).is_err());
    }
}
