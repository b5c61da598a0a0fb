//! EVM JSON-RPC Client
//!
//! Read-only `eth_call` access to Base. Used for ERC-20 metadata and for
//! quoting the burner fee. Retries 429 and 5xx responses with backoff.

use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use thiserror::Error;

use super::types::{EthCallParams, JsonRpcResponse};
use crate::domain::calldata::{self, CalldataError};
use crate::domain::{FeeQuote, TokenAddress};
use crate::ports::{BurnerPort, FetchError, MetadataSource, TokenMeta};

/// Errors that can occur when talking to the RPC node
#[derive(Debug, Error)]
pub enum EvmRpcError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, try again later")]
    RateLimited,

    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    #[error("Call returned no data")]
    EmptyResult,

    #[error(transparent)]
    Calldata(#[from] CalldataError),
}

impl From<EvmRpcError> for FetchError {
    fn from(e: EvmRpcError) -> Self {
        match e {
            EvmRpcError::HttpError(err) => FetchError::from(err),
            EvmRpcError::RateLimited => FetchError::Status {
                status: 429,
                body: "rate limited".to_string(),
            },
            EvmRpcError::EmptyResult => FetchError::NotFound("empty eth_call result".to_string()),
            other => FetchError::Parse(other.to_string()),
        }
    }
}

/// Configuration for the EvmRpcClient
#[derive(Debug, Clone)]
pub struct EvmRpcConfig {
    pub rpc_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Base delay for backoff (milliseconds)
    pub retry_base_delay_ms: u64,
}

impl Default for EvmRpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://mainnet.base.org".to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_base_delay_ms: 250,
        }
    }
}

impl EvmRpcConfig {
    pub fn with_rpc_url(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvmRpcClient {
    config: EvmRpcConfig,
    http: Client,
}

impl EvmRpcClient {
    pub fn with_config(config: EvmRpcConfig) -> Result<Self, EvmRpcError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn rpc_url(&self) -> &str {
        &self.config.rpc_url
    }

    /// `eth_call` against the latest block, returning raw return data
    pub async fn eth_call(&self, to: &TokenAddress, data: &[u8]) -> Result<Vec<u8>, EvmRpcError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                EthCallParams {
                    to: to.to_string(),
                    data: calldata::to_hex_data(data),
                },
                "latest"
            ]
        });

        let response = self
            .execute_with_retry(|| async {
                self.http
                    .post(&self.config.rpc_url)
                    .json(&request_body)
                    .send()
                    .await
                    .map_err(EvmRpcError::from)
            })
            .await?;

        parse_call_result(response)
    }

    async fn execute_with_retry<F, Fut>(&self, request_fn: F) -> Result<JsonRpcResponse, EvmRpcError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, EvmRpcError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = Duration::from_millis(
                            self.config.retry_base_delay_ms * 2u64.pow(attempt + 1),
                        );
                        tracing::warn!(
                            "RPC rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            self.config.max_retries
                        );
                        last_error = Some(EvmRpcError::RateLimited);
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if status.is_server_error() {
                        let backoff = Duration::from_millis(
                            self.config.retry_base_delay_ms * (attempt as u64 + 1),
                        );
                        last_error = Some(EvmRpcError::RpcError {
                            code: status.as_u16() as i64,
                            message: format!("Server error: {}", status),
                        });
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    let body: JsonRpcResponse = response.json().await.map_err(|e| {
                        EvmRpcError::ParseError(format!("Failed to parse JSON: {}", e))
                    })?;

                    return Ok(body);
                }
                Err(e) => {
                    last_error = Some(e);
                    let backoff = Duration::from_millis(
                        self.config.retry_base_delay_ms * (attempt as u64 + 1),
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        Err(last_error.unwrap_or(EvmRpcError::RpcError {
            code: -1,
            message: "Max retries exceeded".into(),
        }))
    }

    async fn call_string(&self, token: &TokenAddress, data: Vec<u8>) -> Result<String, EvmRpcError> {
        let raw = self.eth_call(token, &data).await?;
        Ok(calldata::decode_string(&raw)?)
    }
}

fn parse_call_result(response: JsonRpcResponse) -> Result<Vec<u8>, EvmRpcError> {
    if let Some(err) = response.error {
        return Err(EvmRpcError::RpcError {
            code: err.code,
            message: err.message,
        });
    }

    let result = response.result.ok_or(EvmRpcError::EmptyResult)?;
    let bytes = calldata::from_hex_data(&result)?;
    if bytes.is_empty() {
        return Err(EvmRpcError::EmptyResult);
    }
    Ok(bytes)
}

#[async_trait]
impl MetadataSource for EvmRpcClient {
    async fn metadata(&self, token: &TokenAddress) -> Result<TokenMeta, FetchError> {
        let decimals_call = calldata::encode_decimals();
        let (symbol, name, decimals) = tokio::join!(
            self.call_string(token, calldata::encode_symbol()),
            self.call_string(token, calldata::encode_name()),
            self.eth_call(token, &decimals_call),
        );

        // Non-standard tokens return bytes32 symbols; keep going without them
        let symbol = symbol.unwrap_or_else(|e| {
            tracing::debug!("symbol() failed for {}: {}", token, e);
            String::new()
        });
        let name = name.unwrap_or_else(|e| {
            tracing::debug!("name() failed for {}: {}", token, e);
            String::new()
        });
        let decimals = calldata::decode_decimals(&decimals?).map_err(EvmRpcError::from)?;

        Ok(TokenMeta {
            symbol,
            name,
            decimals,
        })
    }
}

/// Burner contract reached through the RPC client
#[derive(Debug, Clone)]
pub struct BurnerContract {
    rpc: EvmRpcClient,
    address: TokenAddress,
}

impl BurnerContract {
    pub fn new(rpc: EvmRpcClient, address: TokenAddress) -> Self {
        Self { rpc, address }
    }

    pub fn address(&self) -> &TokenAddress {
        &self.address
    }
}

#[async_trait]
impl BurnerPort for BurnerContract {
    async fn quote_erc20_fee(
        &self,
        token: &TokenAddress,
        amount: U256,
    ) -> Result<FeeQuote, FetchError> {
        let data = calldata::encode_quote_fee(token, amount);
        let raw = self.rpc.eth_call(&self.address, &data).await?;
        calldata::decode_quote_fee(&raw).map_err(|e| FetchError::Parse(e.to_string()))
    }
}
