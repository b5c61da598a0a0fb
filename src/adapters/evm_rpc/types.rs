//! JSON-RPC wire types for `eth_call`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct EthCallParams {
    pub to: String,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorBody {
    pub code: i64,
    pub message: String,
}
