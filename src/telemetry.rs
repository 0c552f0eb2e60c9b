//! Tracing subscriber setup for binaries and ad-hoc runs.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_FILTER: &str = "wallet_credit_score=info,warn";

/// Install a compact fmt subscriber filtered by `RUST_LOG`
/// (falls back to [`DEFAULT_FILTER`]). Safe to call more than once;
/// later calls are no-ops.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false))
        .try_init();
}
