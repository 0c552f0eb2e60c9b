//! Scores each address given on the command line against the configured
//! chain, explorer and ledger. Prints one JSON object per address; never writes.
//!
//! ```text
//! cargo run --bin score-wallet -- 0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045
//! ```

use anyhow::{bail, Result};
use wallet_credit_score::{telemetry, EngineConfig, LoanCapPolicy};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let addresses: Vec<String> = std::env::args().skip(1).collect();
    if addresses.is_empty() {
        bail!("usage: score-wallet <address> [<address> ...]");
    }

    let cfg = EngineConfig::from_env()?;
    let aggregator = cfg.build_aggregator()?;
    let policy = LoanCapPolicy::default();

    let mut failures = 0usize;
    for addr in &addresses {
        match aggregator.compute_score(addr).await {
            Ok(result) => {
                let max_loan = policy.max_loan(&result);
                let out = serde_json::json!({
                    "result": result,
                    "max_loan": max_loan,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Err(e) => {
                failures += 1;
                eprintln!("{addr}: {e}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} address(es) could not be scored", addresses.len());
    }
    Ok(())
}
