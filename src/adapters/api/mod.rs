//! HTTP API Adapter
//!
//! axum router exposing the scan, webhook, leaderboard, token listing and
//! manifest endpoints.

mod error;
mod handlers;
mod server;

pub use error::{ApiError, ErrorBody};
pub use handlers::AppState;
pub use server::{router, serve};
