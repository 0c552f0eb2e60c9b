//! Block-explorer index (Etherscan-compatible `module=account` API).
//!
//! One client serves both the normal transaction list (`txlist`) and the
//! ERC-20 transfer list (`tokentx`). The explorer wraps every answer in
//! `{status, message, result}`; only status `"1"` carries a list. Any other
//! status (including "No transactions found") is read as an empty history,
//! never as an error. Transport failures and undecodable payloads are errors.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{TokenActivityProvider, TokenTransfer, Transaction, TransactionProvider};
use crate::address::WalletAddress;
use crate::error::{ScoreError, ScoreResult};

pub const DEFAULT_ETHERSCAN_API_URL: &str = "https://api-sepolia.etherscan.io/api";

const NAME: &str = "etherscan";

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawTx {
    hash: String,
    #[serde(rename = "timeStamp")]
    time_stamp: String,
}

#[derive(Debug, Deserialize)]
struct RawTokenTx {
    #[serde(rename = "tokenSymbol")]
    token_symbol: String,
    #[serde(rename = "contractAddress", default)]
    contract_address: String,
}

#[derive(Clone)]
pub struct EtherscanClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EtherscanClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("wallet-credit-score/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4).min(timeout))
            .timeout(timeout)
            .build()
            .context("building explorer http client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn account_list(&self, action: &str, wallet: &WalletAddress) -> ScoreResult<String> {
        let t0 = std::time::Instant::now();
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("module", "account"),
                ("action", action),
                ("address", wallet.as_str()),
                ("startblock", "0"),
                ("endblock", "99999999"),
                ("sort", "asc"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = ?e, provider = NAME, action, "explorer http error");
                counter!("provider_errors_total", "provider" => NAME).increment(1);
                ScoreError::from_http(NAME, e)
            })?;

        let resp = resp.error_for_status().map_err(|e| {
            counter!("provider_errors_total", "provider" => NAME).increment(1);
            ScoreError::fetch(NAME, e)
        })?;
        let body = resp
            .text()
            .await
            .map_err(|e| ScoreError::from_http(NAME, e))?;

        histogram!("provider_call_ms", "provider" => NAME)
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(body)
    }
}

/// Decode the envelope; non-success statuses become an empty list.
fn parse_envelope<T: DeserializeOwned>(body: &str, action: &str) -> ScoreResult<Vec<T>> {
    let env: Envelope = serde_json::from_str(body)
        .map_err(|e| ScoreError::fetch(NAME, format!("{action}: malformed envelope: {e}")))?;

    if env.status != "1" {
        let message = env.message.as_deref().unwrap_or_default();
        if message.eq_ignore_ascii_case("No transactions found") {
            tracing::debug!(action, "explorer reports no history");
        } else {
            tracing::warn!(
                action,
                status = %env.status,
                explorer_message = message,
                result = %env.result,
                "explorer returned non-success status, treating as empty"
            );
        }
        return Ok(Vec::new());
    }

    match env.result {
        serde_json::Value::Null => Ok(Vec::new()),
        value => serde_json::from_value(value)
            .map_err(|e| ScoreError::fetch(NAME, format!("{action}: malformed result: {e}"))),
    }
}

pub fn parse_transactions(body: &str) -> ScoreResult<Vec<Transaction>> {
    let raw: Vec<RawTx> = parse_envelope(body, "txlist")?;
    raw.into_iter()
        .map(|tx| {
            let secs: i64 = tx.time_stamp.trim().parse().map_err(|_| {
                ScoreError::fetch(NAME, format!("bad timeStamp {:?} on {}", tx.time_stamp, tx.hash))
            })?;
            let timestamp = DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
                ScoreError::fetch(NAME, format!("timeStamp {secs} out of range on {}", tx.hash))
            })?;
            Ok(Transaction {
                hash: tx.hash,
                timestamp,
            })
        })
        .collect()
}

pub fn parse_token_transfers(body: &str) -> ScoreResult<Vec<TokenTransfer>> {
    let raw: Vec<RawTokenTx> = parse_envelope(body, "tokentx")?;
    Ok(raw
        .into_iter()
        .map(|t| TokenTransfer {
            token_symbol: t.token_symbol,
            contract_address: t.contract_address,
        })
        .collect())
}

#[async_trait]
impl TransactionProvider for EtherscanClient {
    async fn transactions(&self, wallet: &WalletAddress) -> ScoreResult<Vec<Transaction>> {
        let body = self.account_list("txlist", wallet).await?;
        parse_transactions(&body)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[async_trait]
impl TokenActivityProvider for EtherscanClient {
    async fn token_transfers(&self, wallet: &WalletAddress) -> ScoreResult<Vec<TokenTransfer>> {
        let body = self.account_list("tokentx", wallet).await?;
        parse_token_transfers(&body)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
