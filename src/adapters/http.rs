//! Shared reqwest helpers for the JSON REST adapters.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::ports::FetchError;

/// Longest error body kept in `FetchError::Status`
const MAX_ERROR_BODY: usize = 256;

/// Build a client with a request timeout
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("pubs-burn/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::from)
}

/// Send a request and decode a JSON body, mapping non-2xx to `FetchError::Status`
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, FetchError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let body: String = text.chars().take(MAX_ERROR_BODY).collect();
        return Err(FetchError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| FetchError::Parse(e.to_string()))
}
