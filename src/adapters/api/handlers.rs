//! Route handlers
//!
//! Thin translation between HTTP and the application services held by
//! `ServiceContext`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::error::ApiError;
use crate::application::{
    BurnableToken, ScanReport, ServiceContext, WebhookReply, SIGNATURE_HEADER,
};
use crate::domain::{LeaderboardEntry, TokenAddress};

pub type AppState = Arc<ServiceContext>;

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokensQuery {
    pub wallet: Option<String>,
}

/// GET /api/scan?token=<address>
pub async fn scan(
    State(ctx): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<ScanReport>, ApiError> {
    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("token required".to_string()))?;

    let report = ctx.scan.scan(&token).await?;
    Ok(Json(report))
}

/// POST /api/webhook
///
/// The raw body is needed for the HMAC, so it is taken as bytes and parsed
/// only after verification.
pub async fn webhook(
    State(ctx): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookReply>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let reply = ctx.webhook.handle(signature, &body).await?;
    Ok(Json(reply))
}

/// GET /api/leaderboard
pub async fn leaderboard(
    State(ctx): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let service = ctx
        .leaderboard
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("burner contract not configured".to_string()))?;

    Ok(Json(service.top_burners().await?))
}

/// GET /api/tokens?wallet=<address>
pub async fn tokens(
    State(ctx): State<AppState>,
    Query(query): Query<TokensQuery>,
) -> Result<Json<Vec<BurnableToken>>, ApiError> {
    let raw = query
        .wallet
        .ok_or_else(|| ApiError::BadRequest("wallet required".to_string()))?;
    let wallet = TokenAddress::parse(&raw)?;

    Ok(Json(ctx.portfolio.list_burnable(&wallet).await?))
}

/// GET /.well-known/farcaster.json
pub async fn manifest(State(ctx): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let manifest = ctx
        .manifest
        .clone()
        .ok_or_else(|| ApiError::NotFound("manifest not configured".to_string()))?;

    Ok((
        [(header::CACHE_CONTROL, "max-age=0, must-revalidate")],
        Json(manifest),
    ))
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
