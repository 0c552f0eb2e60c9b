use anyhow::{Context, Result};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder for this process.
    /// Fails if another global recorder is already installed.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Exposition text for a scrape.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// One-time metrics registration (so series carry help text).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scoring_requests_total", "Score computations started.");
        describe_counter!(
            "scoring_failures_total",
            "Score computations that failed, by error kind."
        );
        describe_histogram!("scoring_duration_ms", "Score computation time in milliseconds.");
        describe_histogram!("risk_score_value", "Distribution of computed risk scores.");
        describe_counter!("loan_caps_computed_total", "Max-loan derivations.");
        describe_counter!(
            "score_sink_writes_total",
            "Score persistence attempts, by sink and outcome."
        );
        describe_counter!("provider_errors_total", "Provider transport/HTTP errors.");
        describe_histogram!("provider_call_ms", "Provider call time in milliseconds.");
    });
}
