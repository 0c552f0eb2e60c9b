// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::net::TcpListener;

use wallet_credit_score::providers::{
    BalanceProvider, PlatformHistoryProvider, RepaymentHistory, ScoreProviders,
    TokenActivityProvider, TokenTransfer, Transaction, TransactionProvider,
};
use wallet_credit_score::{ScoreError, ScoreResult, WalletAddress};

pub const WALLET: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

/// Fixed "now" so scores are reproducible.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

/// Ordered log of provider calls, shared by all fakes of one wallet.
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

/// One synthetic wallet: what every fake provider reports for it.
#[derive(Clone)]
pub struct WalletFixture {
    pub good_loans: u64,
    pub defaulted_loans: u64,
    pub balance: f64,
    pub connected: bool,
    pub tx_times: Vec<DateTime<Utc>>,
    pub token_symbols: Vec<&'static str>,
    /// Provider name that should fail with `DataFetch`.
    pub failing: Option<&'static str>,
    pub log: CallLog,
}

impl Default for WalletFixture {
    fn default() -> Self {
        Self {
            good_loans: 0,
            defaulted_loans: 0,
            balance: 0.0,
            connected: true,
            tx_times: Vec::new(),
            token_symbols: Vec::new(),
            failing: None,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl WalletFixture {
    pub fn calls(&self) -> Vec<&'static str> {
        self.log.lock().clone()
    }

    fn enter(&self, name: &'static str) -> ScoreResult<()> {
        self.log.lock().push(name);
        if self.failing == Some(name) {
            return Err(ScoreError::fetch(name, "synthetic failure"));
        }
        Ok(())
    }

    pub fn providers(&self) -> ScoreProviders {
        let shared = Arc::new(self.clone());
        ScoreProviders {
            history: Arc::new(FakeHistory(shared.clone())),
            balances: Arc::new(FakeBalance(shared.clone())),
            transactions: Arc::new(FakeTransactions(shared.clone())),
            tokens: Arc::new(FakeTokens(shared)),
        }
    }
}

pub struct FakeHistory(Arc<WalletFixture>);
pub struct FakeBalance(Arc<WalletFixture>);
pub struct FakeTransactions(Arc<WalletFixture>);
pub struct FakeTokens(Arc<WalletFixture>);

#[async_trait]
impl PlatformHistoryProvider for FakeHistory {
    async fn repayment_history(&self, _wallet: &WalletAddress) -> ScoreResult<RepaymentHistory> {
        self.0.enter("history")?;
        Ok(RepaymentHistory::new(self.0.good_loans, self.0.defaulted_loans))
    }
    fn name(&self) -> &'static str {
        "history"
    }
}

#[async_trait]
impl BalanceProvider for FakeBalance {
    async fn check_connection(&self) -> ScoreResult<()> {
        self.0.log.lock().push("connect");
        if self.0.connected {
            Ok(())
        } else {
            Err(ScoreError::unavailable("balance", "node offline"))
        }
    }
    async fn native_balance(&self, _wallet: &WalletAddress) -> ScoreResult<f64> {
        self.0.enter("balance")?;
        Ok(self.0.balance)
    }
    fn name(&self) -> &'static str {
        "balance"
    }
}

#[async_trait]
impl TransactionProvider for FakeTransactions {
    async fn transactions(&self, _wallet: &WalletAddress) -> ScoreResult<Vec<Transaction>> {
        self.0.enter("transactions")?;
        Ok(self
            .0
            .tx_times
            .iter()
            .enumerate()
            .map(|(i, ts)| Transaction {
                hash: format!("0x{i:064x}"),
                timestamp: *ts,
            })
            .collect())
    }
    fn name(&self) -> &'static str {
        "transactions"
    }
}

#[async_trait]
impl TokenActivityProvider for FakeTokens {
    async fn token_transfers(&self, _wallet: &WalletAddress) -> ScoreResult<Vec<TokenTransfer>> {
        self.0.enter("tokens")?;
        Ok(self
            .0
            .token_symbols
            .iter()
            .map(|s| TokenTransfer {
                token_symbol: s.to_string(),
                contract_address: String::new(),
            })
            .collect())
    }
    fn name(&self) -> &'static str {
        "tokens"
    }
}

// ---- In-process HTTP upstreams ----

/// What a stub upstream saw, captured before the route handler runs.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl SeenRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or_default()
    }
}

type RequestLog = Arc<Mutex<Vec<SeenRequest>>>;

async fn record(State(log): State<RequestLog>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, 1 << 20).await.unwrap_or_default();
    let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(q)| q)
        .unwrap_or_default();
    log.lock().push(SeenRequest {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        query,
        headers: parts.headers.clone(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    });
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Serves `app` on 127.0.0.1 with every request recorded.
pub struct StubServer {
    pub url: String,
    log: RequestLog,
}

impl StubServer {
    pub async fn start(app: Router) -> Self {
        let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
        let app = app.layer(middleware::from_fn_with_state(log.clone(), record));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let url = format!("http://{}", listener.local_addr().expect("addr"));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { url, log }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.log.lock().clone()
    }
}

/// A URL on a port nothing listens on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}
