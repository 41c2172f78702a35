//! `POST /api/chat` — forward one message to the configured LLM.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::extract::ApiJson;
use crate::api::types::ApiContext;
use crate::chat::MAX_MESSAGE_CHARS;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub async fn send(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Message too long (max {MAX_MESSAGE_CHARS} characters)"
        )));
    }

    let reply = ctx
        .chat
        .reply(message)
        .await
        .map_err(|e| ApiError::ChatUnavailable(format!("{}: {e}", ctx.chat.name())))?;

    Ok(Json(ChatResponse { reply }))
}
