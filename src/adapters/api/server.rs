//! Router assembly and the listening loop

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};
use crate::application::ServiceContext;

/// All routes, sharing one `ServiceContext`
pub fn router(ctx: Arc<ServiceContext>) -> Router {
    let api_routes = Router::new()
        .route("/scan", get(handlers::scan))
        .route("/webhook", post(handlers::webhook))
        // Older Mini App registrations point here for the manifest
        .route("/webhook/farcaster", get(handlers::manifest))
        .route("/leaderboard", get(handlers::leaderboard))
        .route("/tokens", get(handlers::tokens));

    Router::<AppState>::new()
        .nest("/api", api_routes)
        .route("/.well-known/farcaster.json", get(handlers::manifest))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Serve until Ctrl+C
pub async fn serve(ctx: Arc<ServiceContext>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(ctx);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
