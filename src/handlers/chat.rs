use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Instant;
use crate::error::ApiError;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{ChatRequest, ChatResponse, ChatTurn};
use crate::state::AppState;

const MAX_MESSAGE_CHARS: usize = 4000;

fn validate(req: &ChatRequest) -> Result<(), ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }
    if req.message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "message is longer than {} characters",
            MAX_MESSAGE_CHARS
        )));
    }
    if let Some(turn) = req.history.iter().find(|t| !is_allowed_role(t)) {
        return Err(ApiError::BadRequest(format!(
            "history role must be \"user\" or \"assistant\", got {:?}",
            turn.role
        )));
    }
    Ok(())
}

fn is_allowed_role(turn: &ChatTurn) -> bool {
    turn.role == "user" || turn.role == "assistant"
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    REQUEST_TOTAL.inc();
    validate(&payload)?;

    let start_time = Instant::now();
    let result = state.chat.reply(&payload.message, &payload.history).await;
    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    let reply = result?;

    Ok(Json(ChatResponse {
        reply,
        model: state.chat.model().to_string(),
    }))
}
