//! GoPlus token-security response types
//!
//! Every flag arrives as a string: `"1"` true, `"0"` false, absent unknown.
//! Taxes are decimal fractions encoded as strings (`"0.05"`).

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSecurityResponse {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    /// Keyed by lower-case contract address
    #[serde(default)]
    pub result: Option<HashMap<String, TokenSecurity>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenSecurity {
    #[serde(default)]
    pub is_honeypot: Option<String>,
    #[serde(default)]
    pub cannot_sell_all: Option<String>,
    #[serde(default)]
    pub is_mintable: Option<String>,
    #[serde(default)]
    pub hidden_owner: Option<String>,
    #[serde(default)]
    pub buy_tax: Option<String>,
    #[serde(default)]
    pub sell_tax: Option<String>,
}

pub fn flag(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim) == Some("1")
}

pub fn tax(value: &Option<String>) -> Option<f64> {
    value.as_deref().and_then(|v| v.trim().parse::<f64>().ok())
}
