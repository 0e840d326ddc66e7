use crate::core::build_chat_prompt;
use crate::error::ApiError;
use crate::models::{ChatRequest, ChatResponse};
use crate::routes::AppState;
use actix_web::{web, HttpResponse};
use validator::Validate;

const ANONYMOUS_SESSION: &str = "anonymous";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/chatbot/chat", web::post().to(chat));
}

/// POST /api/chatbot/chat
///
/// Request body:
/// ```json
/// { "message": "string", "sessionId": "string (optional)" }
/// ```
async fn chat(
    state: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(|e| ApiError::validation(&e))?;

    let session_id = req
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(ANONYMOUS_SESSION);

    let first_message = state.conversations.register_message(session_id).await;
    let prompt = build_chat_prompt(req.message.trim(), first_message);

    let reply = state
        .assistant
        .complete(&prompt)
        .await
        .map_err(|e| ApiError::internal("Failed to process chat message", &e, state.expose_error_details))?
        .ok_or_else(|| {
            ApiError::internal(
                "Failed to process chat message",
                &"Invalid response format from AI",
                state.expose_error_details,
            )
        })?;

    tracing::debug!("Chat reply for session {} ({} chars)", session_id, reply.len());

    Ok(HttpResponse::Ok().json(ChatResponse {
        response: reply.trim().to_string(),
    }))
}
