//! Token Address
//!
//! Normalized ERC-20 contract address. Every lookup, cache key and blocklist
//! entry goes through `TokenAddress::parse`, so two spellings of the same
//! contract (checksummed vs lower-case) always compare equal.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of hex digits in a 20-byte address
const ADDRESS_HEX_LEN: usize = 40;

/// Rejected address input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenAddressError {
    #[error("token address is empty")]
    Empty,

    #[error("token address must start with 0x: {0}")]
    MissingPrefix(String),

    #[error("token address must have 40 hex digits, got {len}: {input}")]
    InvalidLength { input: String, len: usize },

    #[error("token address contains non-hex characters: {0}")]
    InvalidHex(String),
}

/// Lower-case, `0x`-prefixed 20-byte hex address
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TokenAddress(String);

impl TokenAddress {
    /// Parse and normalize an address string.
    ///
    /// Accepts checksummed or lower-case input, surrounding whitespace is
    /// ignored. Checksums are not verified.
    pub fn parse(input: &str) -> Result<Self, TokenAddressError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TokenAddressError::Empty);
        }

        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| TokenAddressError::MissingPrefix(trimmed.to_string()))?;

        if digits.len() != ADDRESS_HEX_LEN {
            return Err(TokenAddressError::InvalidLength {
                input: trimmed.to_string(),
                len: digits.len(),
            });
        }

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TokenAddressError::InvalidHex(trimmed.to_string()));
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    /// Normalized string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to an alloy `Address` for ABI encoding
    pub fn to_address(&self) -> Address {
        // Already validated as 40 hex digits
        Address::from_str(&self.0).unwrap_or(Address::ZERO)
    }

    /// Build from an alloy `Address`
    pub fn from_address(address: Address) -> Self {
        Self(format!("0x{}", hex::encode(address.as_slice())))
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TokenAddress {
    type Err = TokenAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for TokenAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TokenAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        TokenAddress::parse(&raw).map_err(serde::de::Error::custom)
    }
}
