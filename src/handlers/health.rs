use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;
use crate::state::AppState;

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let recent_ai_calls = state.limiter.recent_calls().await;

    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "ai_ready": state.ai_ready(),
        "recent_ai_calls": recent_ai_calls,
        "ai_call_limit": state.limiter.max_calls(),
    }))
}
