//! Error taxonomy for a scoring run.
//!
//! Every failure out of `compute_score` is one of three kinds. There is no
//! partial or degraded score: the first provider error aborts the run.

use thiserror::Error;

pub type ScoreResult<T> = std::result::Result<T, ScoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// Malformed or badly checksummed address. Caller fault, not retryable.
    #[error("invalid wallet address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    /// A required upstream could not be reached at all.
    #[error("provider {provider} unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    /// Upstream answered with an error status or a payload we could not use.
    #[error("data fetch from {provider} failed: {reason}")]
    DataFetch {
        provider: &'static str,
        reason: String,
    },
}

impl ScoreError {
    pub fn invalid_address(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn unavailable(provider: &'static str, reason: impl ToString) -> Self {
        Self::ProviderUnavailable {
            provider,
            reason: reason.to_string(),
        }
    }

    pub fn fetch(provider: &'static str, reason: impl ToString) -> Self {
        Self::DataFetch {
            provider,
            reason: reason.to_string(),
        }
    }

    /// Map a transport error: connect failures mean the upstream is unreachable,
    /// everything else is a fetch failure. A timed-out connect is a timeout.
    pub fn from_http(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::fetch(provider, err)
        } else if err.is_connect() {
            Self::unavailable(provider, err)
        } else {
            Self::fetch(provider, err)
        }
    }

    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAddress { .. } => "invalid_address",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::DataFetch { .. } => "data_fetch",
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidAddress { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_invalid_address_is_final() {
        assert!(!ScoreError::invalid_address("0x1", "too short").is_retryable());
        assert!(ScoreError::unavailable("rpc", "refused").is_retryable());
        assert!(ScoreError::fetch("etherscan", "bad json").is_retryable());
    }

    #[test]
    fn display_names_the_provider() {
        let e = ScoreError::fetch("etherscan", "HTTP 502");
        assert_eq!(e.to_string(), "data fetch from etherscan failed: HTTP 502");
        assert_eq!(e.kind(), "data_fetch");
    }
}
