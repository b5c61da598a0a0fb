//! BaseScan (Etherscan-compatible) response types

use serde::Deserialize;
use serde_json::Value;

/// Envelope shared by every explorer endpoint.
///
/// `result` is an array on success and a plain message string on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceCodeEntry {
    #[serde(rename = "SourceCode", default)]
    pub source_code: String,
    #[serde(rename = "ContractName", default)]
    pub contract_name: String,
}
