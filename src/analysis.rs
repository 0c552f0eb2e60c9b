//! Per-signal audit trail of one scoring run.
//!
//! Keys come from a fixed set ([`Signal`]) so callers (the loan policy, the
//! ledger sink, humans reading JSON) can rely on stable names. Entries keep
//! the order in which the aggregator recorded them.

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    PlatformGoodLoans,
    PlatformDefaultedLoans,
    PlatformScore,
    EthBalance,
    BalanceScore,
    WalletAgeDays,
    AgeScore,
    TransactionCount,
    TxScore,
    Erc20TokenVarietyCount,
    TokenScore,
}

impl Signal {
    pub const ALL: [Signal; 11] = [
        Signal::PlatformGoodLoans,
        Signal::PlatformDefaultedLoans,
        Signal::PlatformScore,
        Signal::EthBalance,
        Signal::BalanceScore,
        Signal::WalletAgeDays,
        Signal::AgeScore,
        Signal::TransactionCount,
        Signal::TxScore,
        Signal::Erc20TokenVarietyCount,
        Signal::TokenScore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::PlatformGoodLoans => "platform_good_loans",
            Signal::PlatformDefaultedLoans => "platform_defaulted_loans",
            Signal::PlatformScore => "platform_score",
            Signal::EthBalance => "eth_balance",
            Signal::BalanceScore => "balance_score",
            Signal::WalletAgeDays => "wallet_age_days",
            Signal::AgeScore => "age_score",
            Signal::TransactionCount => "transaction_count",
            Signal::TxScore => "tx_score",
            Signal::Erc20TokenVarietyCount => "erc20_token_variety_count",
            Signal::TokenScore => "token_score",
        }
    }

    /// Whether the value is a weighted contribution rather than a raw reading.
    pub fn is_contribution(self) -> bool {
        matches!(
            self,
            Signal::PlatformScore
                | Signal::BalanceScore
                | Signal::AgeScore
                | Signal::TxScore
                | Signal::TokenScore
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisBreakdown {
    entries: Vec<(Signal, f64)>,
    note: Option<String>,
}

impl AnalysisBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value. Recording the same signal twice overwrites in place.
    pub fn record(&mut self, signal: Signal, value: f64) {
        match self.entries.iter_mut().find(|(s, _)| *s == signal) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((signal, value)),
        }
    }

    pub fn with(mut self, signal: Signal, value: f64) -> Self {
        self.record(signal, value);
        self
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = Some(note.into());
    }

    pub fn get(&self, signal: Signal) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| *s == signal)
            .map(|(_, v)| *v)
    }

    /// Integer reading of a count-like signal, 0 when absent or negative.
    pub fn count(&self, signal: Signal) -> u64 {
        self.get(signal)
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v as u64)
            .unwrap_or(0)
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Signal, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Sum of the weighted contributions recorded so far.
    pub fn total_contribution(&self) -> f64 {
        self.entries
            .iter()
            .filter(|(s, _)| s.is_contribution())
            .map(|(_, v)| v)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AnalysisBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.entries.len() + usize::from(self.note.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (signal, value) in &self.entries {
            map.serialize_entry(signal.as_str(), value)?;
        }
        if let Some(note) = &self.note {
            map.serialize_entry("note", note)?;
        }
        map.end()
    }
}
