pub mod cache;
pub mod chat;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod rate_limit;
pub mod retry;
pub mod state;
pub mod vision;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use crate::state::AppState;

// JSON bodies carry base64 photos, leave room for the encoding overhead
pub fn body_limit(max_image_bytes: usize) -> usize {
    (max_image_bytes / 3).saturating_mul(4).saturating_add(64 * 1024)
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = body_limit(state.max_image_bytes);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/chat", post(handlers::chat_handler))
        .route("/api/recognize", post(handlers::recognize_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
