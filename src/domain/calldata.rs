//! Contract Calldata
//!
//! ABI bindings for the ERC-20 token and the burner contract, plus helpers to
//! move between hex strings, `U256` and display amounts.

use alloy::primitives::U256;
use alloy::sol;
use alloy::sol_types::SolCall;
use thiserror::Error;

use super::token::TokenAddress;

sol! {
    interface IERC20 {
        function symbol() external view returns (string);
        function name() external view returns (string);
        function decimals() external view returns (uint8);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    interface IBurner {
        function quoteErc20Fee(address token, uint256 amount) external view returns (uint256 fee, uint8 decimals);
        function burnToken(address token, uint256 amount, string summary) external payable;
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalldataError {
    #[error("Invalid hex data: {0}")]
    InvalidHex(String),

    #[error("ABI decode failed: {0}")]
    Decode(String),
}

/// Fee charged by the burner for one ERC-20 burn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Native-currency fee in wei, sent as `value` with `burnToken`
    pub fee: U256,
    pub decimals: u8,
}

pub fn encode_symbol() -> Vec<u8> {
    IERC20::symbolCall {}.abi_encode()
}

pub fn encode_name() -> Vec<u8> {
    IERC20::nameCall {}.abi_encode()
}

pub fn encode_decimals() -> Vec<u8> {
    IERC20::decimalsCall {}.abi_encode()
}

pub fn decode_string(data: &[u8]) -> Result<String, CalldataError> {
    IERC20::symbolCall::abi_decode_returns(data).map_err(|e| CalldataError::Decode(e.to_string()))
}

pub fn decode_decimals(data: &[u8]) -> Result<u8, CalldataError> {
    IERC20::decimalsCall::abi_decode_returns(data)
        .map_err(|e| CalldataError::Decode(e.to_string()))
}

/// `approve(spender, amount)` sent to the token contract
pub fn encode_approve(spender: &TokenAddress, amount: U256) -> Vec<u8> {
    IERC20::approveCall {
        spender: spender.to_address(),
        amount,
    }
    .abi_encode()
}

pub fn encode_quote_fee(token: &TokenAddress, amount: U256) -> Vec<u8> {
    IBurner::quoteErc20FeeCall {
        token: token.to_address(),
        amount,
    }
    .abi_encode()
}

pub fn decode_quote_fee(data: &[u8]) -> Result<FeeQuote, CalldataError> {
    let ret = IBurner::quoteErc20FeeCall::abi_decode_returns(data)
        .map_err(|e| CalldataError::Decode(e.to_string()))?;
    Ok(FeeQuote {
        fee: ret.fee,
        decimals: ret.decimals,
    })
}

/// `burnToken(token, amount, summary)` sent to the burner with the quoted fee
pub fn encode_burn(token: &TokenAddress, amount: U256, summary: &str) -> Vec<u8> {
    IBurner::burnTokenCall {
        token: token.to_address(),
        amount,
        summary: summary.to_string(),
    }
    .abi_encode()
}

/// `0x`-prefixed lower-case hex
pub fn to_hex_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

pub fn from_hex_data(data: &str) -> Result<Vec<u8>, CalldataError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(digits).map_err(|_| CalldataError::InvalidHex(data.to_string()))
}

/// Lossy conversion of base units to a float for display
pub fn format_units(amount: U256, decimals: u8) -> f64 {
    let raw: f64 = amount.to_string().parse().unwrap_or(0.0);
    raw / 10f64.powi(decimals as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn burner() -> TokenAddress {
        TokenAddress::parse("0x1111111111111111111111111111111111111111").unwrap()
    }

    #[test]
    fn test_approve_selector() {
        let data = encode_approve(&burner(), U256::from(1000u64));
        assert_eq!(&data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(data.len(), 4 + 32 * 2);
    }

    #[test]
    fn test_decimals_selector() {
        assert_eq!(encode_decimals(), vec![0x31, 0x3c, 0xe5, 0x67]);
    }

    #[test]
    fn test_burn_encodes_summary() {
        let data = encode_burn(&burner(), U256::from(5u64), "PUBS BURN");
        let decoded = IBurner::burnTokenCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.summary, "PUBS BURN");
        assert_eq!(decoded.amount, U256::from(5u64));
    }

    #[test]
    fn test_decode_quote_fee() {
        let mut data = vec![0u8; 64];
        data[31] = 0x64; // fee = 100
        data[63] = 18;
        let quote = decode_quote_fee(&data).unwrap();
        assert_eq!(quote.fee, U256::from(100u64));
        assert_eq!(quote.decimals, 18);
    }

    #[test]
    fn test_decode_rejects_short_data() {
        assert!(decode_decimals(&[0u8; 4]).is_err());
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(to_hex_data(&[0xde, 0xad]), "0xdead");
        assert_eq!(from_hex_data("0xdead").unwrap(), vec![0xde, 0xad]);
        assert!(from_hex_data("0xzz").is_err());
    }

    #[test]
    fn test_format_units() {
        assert_relative_eq!(format_units(U256::from(1_500_000u64), 6), 1.5);
    }
}
