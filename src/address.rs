//! # Wallet addresses
//!
//! Parsing is the single validation point: a [`WalletAddress`] always holds a
//! well-formed 20-byte address and its EIP-55 checksummed text.
//!
//! - Optional `0x` / `0X` prefix, then exactly 40 hex digits.
//! - All-lowercase or all-uppercase digits carry no checksum and are normalized.
//! - Mixed case must match the EIP-55 checksum exactly.

use std::{fmt, str::FromStr};

use ethers::types::Address;
use ethers::utils::to_checksum;
use serde::{Serialize, Serializer};

use crate::error::ScoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletAddress {
    raw: Address,
    checksummed: String,
}

impl WalletAddress {
    pub fn parse(input: &str) -> Result<Self, ScoreError> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if body.len() != 40 {
            return Err(ScoreError::invalid_address(
                input,
                format!("expected 40 hex digits, got {}", body.len()),
            ));
        }
        if !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ScoreError::invalid_address(input, "non-hex character"));
        }

        let raw = Address::from_str(&body.to_ascii_lowercase())
            .map_err(|e| ScoreError::invalid_address(input, e.to_string()))?;
        let checksummed = to_checksum(&raw, None);

        let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && &checksummed[2..] != body {
            return Err(ScoreError::invalid_address(input, "checksum mismatch"));
        }

        Ok(Self { raw, checksummed })
    }

    pub fn as_address(&self) -> Address {
        self.raw
    }

    /// EIP-55 text form, `0x`-prefixed.
    pub fn as_str(&self) -> &str {
        &self.checksummed
    }
}

impl FromStr for WalletAddress {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed)
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.checksummed)
    }
}
