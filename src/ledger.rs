//! Platform ledger behind a PostgREST (Supabase) REST API.
//!
//! Read side: repayment history from the `loans` table.
//! Write side: score fields on the `users` row keyed by wallet.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::address::WalletAddress;
use crate::error::{ScoreError, ScoreResult};
use crate::providers::{PlatformHistoryProvider, RepaymentHistory};
use crate::score::RiskLevel;
use crate::sink::{ScoreRecord, ScoreSink};

const NAME: &str = "ledger";

const LOANS_TABLE: &str = "loans";
const USERS_TABLE: &str = "users";
const WALLET_COLUMN: &str = "wallet";

#[derive(Debug, Deserialize)]
struct LoanStatusRow {
    status: String,
}

#[derive(Debug, Serialize)]
struct UserScoreUpdate<'a> {
    risk_score: u16,
    risk_level: RiskLevel,
    max_loan: u64,
    last_updated: &'a chrono::DateTime<chrono::Utc>,
}

#[derive(Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl LedgerClient {
    pub fn new(base_url: &str, service_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("wallet-credit-score/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4).min(timeout))
            .timeout(timeout)
            .build()
            .context("building ledger http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

/// `repaid`/`completed`/`closed` are good, `defaulted` is bad, anything else is still open.
pub fn tally_statuses<'a, I>(statuses: I) -> RepaymentHistory
where
    I: IntoIterator<Item = &'a str>,
{
    let mut history = RepaymentHistory::default();
    for status in statuses {
        match status.trim().to_ascii_lowercase().as_str() {
            "repaid" | "completed" | "closed" => history.good_loans += 1,
            "defaulted" => history.defaulted_loans += 1,
            _ => {}
        }
    }
    history
}

#[async_trait]
impl PlatformHistoryProvider for LedgerClient {
    async fn repayment_history(&self, wallet: &WalletAddress) -> ScoreResult<RepaymentHistory> {
        let req = self
            .http
            .get(self.table_url(LOANS_TABLE))
            .query(&[
                ("borrower_id", format!("eq.{wallet}")),
                ("select", "status".to_string()),
            ]);
        let resp = self
            .authed(req)
            .send()
            .await
            .map_err(|e| ScoreError::from_http(NAME, e))?
            .error_for_status()
            .map_err(|e| ScoreError::fetch(NAME, e))?;
        let rows: Vec<LoanStatusRow> = resp
            .json()
            .await
            .map_err(|e| ScoreError::fetch(NAME, format!("malformed loans payload: {e}")))?;

        let history = tally_statuses(rows.iter().map(|r| r.status.as_str()));
        tracing::debug!(
            wallet = %wallet,
            loans = rows.len(),
            good = history.good_loans,
            defaulted = history.defaulted_loans,
            "ledger repayment history"
        );
        Ok(history)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[async_trait]
impl ScoreSink for LedgerClient {
    async fn persist(&self, record: &ScoreRecord) -> Result<()> {
        let payload = UserScoreUpdate {
            risk_score: record.risk_score,
            risk_level: record.risk_level,
            max_loan: record.max_loan,
            last_updated: &record.last_updated,
        };
        let req = self
            .http
            .patch(self.table_url(USERS_TABLE))
            .query(&[(WALLET_COLUMN, format!("eq.{}", record.wallet_address))])
            .header("Prefer", "return=minimal")
            .json(&payload);

        let outcome = self.authed(req).send().await;
        let result = match outcome {
            Ok(rsp) => match rsp.error_for_status_ref() {
                Ok(_) => Ok(()),
                Err(e) => Err(anyhow!("ledger update HTTP error: {e}")),
            },
            Err(e) => Err(anyhow!("ledger update request failed: {e}")),
        };

        let label = if result.is_ok() { "ok" } else { "error" };
        counter!("score_sink_writes_total", "sink" => NAME, "outcome" => label).increment(1);
        result.with_context(|| format!("persisting score for {}", record.wallet_address))
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
