//! Score weights, loaded once per process.
//!
//! TOML shape (JSON with the same keys works too):
//! ```toml
//! platform_repayment_good = 150
//! platform_repayment_bad = -300
//! wallet_age_days = 1.5
//! eth_balance = 50
//! tx_count = 0.5
//! erc20_token_count = 10
//! ```
//!
//! Missing keys fall back to the built-in defaults.
//! Lookup order for `load_default()`:
//! 1) $SCORE_WEIGHTS_PATH
//! 2) config/score_weights.toml
//! 3) config/score_weights.json
//! 4) built-in defaults

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_WEIGHTS_PATH: &str = "SCORE_WEIGHTS_PATH";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub platform_repayment_good: f64,
    pub platform_repayment_bad: f64,
    pub wallet_age_days: f64,
    pub eth_balance: f64,
    pub tx_count: f64,
    pub erc20_token_count: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            platform_repayment_good: 150.0,
            platform_repayment_bad: -300.0,
            wallet_age_days: 1.5,
            eth_balance: 50.0,
            tx_count: 0.5,
            erc20_token_count: 10.0,
        }
    }
}

impl ScoreWeights {
    /// Load from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading score weights from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let w = parse_weights(&content, ext.as_str())
            .with_context(|| format!("parsing score weights from {}", path.display()))?;
        w.validate()?;
        Ok(w)
    }

    /// Env var, then the two conventional files, then defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_WEIGHTS_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_WEIGHTS_PATH} points to non-existent path {}", pb.display());
            }
            return Self::load_from(&pb);
        }
        for candidate in ["config/score_weights.toml", "config/score_weights.json"] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        let named = [
            ("platform_repayment_good", self.platform_repayment_good),
            ("platform_repayment_bad", self.platform_repayment_bad),
            ("wallet_age_days", self.wallet_age_days),
            ("eth_balance", self.eth_balance),
            ("tx_count", self.tx_count),
            ("erc20_token_count", self.erc20_token_count),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                bail!("weight {name} must be finite, got {value}");
            }
        }
        Ok(())
    }
}

fn parse_weights(s: &str, hint_ext: &str) -> Result<ScoreWeights> {
    if hint_ext == "json" {
        return serde_json::from_str(s).map_err(Into::into);
    }
    if hint_ext == "toml" {
        return toml::from_str(s).map_err(Into::into);
    }
    // Unknown extension: JSON objects start with '{', anything else is tried as TOML.
    if s.trim_start().starts_with('{') {
        serde_json::from_str(s).map_err(Into::into)
    } else {
        toml::from_str(s).map_err(|e| anyhow!("unsupported weights format: {e}"))
    }
}
