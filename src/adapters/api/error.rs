//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::application::{ScanError, WebhookError};
use crate::domain::TokenAddressError;
use crate::ports::FetchError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),

    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error("Upstream lookup failed: {0}")]
    Upstream(#[from] FetchError),
}

impl From<ScanError> for ApiError {
    fn from(e: ScanError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<TokenAddressError> for ApiError {
    fn from(e: TokenAddressError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Webhook(WebhookError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Webhook(WebhookError::MissingSignature) => StatusCode::BAD_REQUEST,
            ApiError::Webhook(WebhookError::InvalidSignature) => StatusCode::FORBIDDEN,
            ApiError::Webhook(WebhookError::MalformedBody(_)) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_status_mapping() {
        assert_eq!(
            ApiError::from(WebhookError::NotConfigured).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(WebhookError::MissingSignature).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(WebhookError::InvalidSignature).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(WebhookError::MalformedBody("eof".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_upstream_is_bad_gateway() {
        let err = ApiError::from(FetchError::Timeout(std::time::Duration::from_secs(1)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
