use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use omteam_core::chat::{
    ChatMessageRequest, ChatMessageResponse, ChatSessionOpen, ChatSessionRequest,
    ChatSessionResponse, ChatTurn,
};
use omteam_core::error::ApiError;
use omteam_core::pipeline::dispatch;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ai/chat/sessions", post(create_chat_session))
        .route("/ai/chat/messages", post(handle_chat_message))
}

/// Open a coaching chat session with a greeting and quick-reply options
#[utoipa::path(
    post,
    path = "/ai/chat/sessions",
    request_body = ChatSessionRequest,
    responses(
        (status = 200, description = "Session opened", body = ChatSessionResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 500, description = "Agent reply unusable or agent unreachable", body = ApiError)
    ),
    tag = "chat"
)]
pub async fn create_chat_session(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChatSessionRequest>,
) -> Result<Json<ChatSessionResponse>, AppError> {
    let response = dispatch::<ChatSessionOpen>(state.agent.as_ref(), &req).await?;
    Ok(Json(response))
}

/// Answer one user turn
///
/// Conversation history is not kept here; the agent is responsible for it.
#[utoipa::path(
    post,
    path = "/ai/chat/messages",
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Bot reply generated", body = ChatMessageResponse),
        (status = 400, description = "Validation error (e.g. OPTION input without value)", body = ApiError),
        (status = 500, description = "Agent reply unusable or agent unreachable", body = ApiError)
    ),
    tag = "chat"
)]
pub async fn handle_chat_message(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChatMessageRequest>,
) -> Result<Json<ChatMessageResponse>, AppError> {
    req.validate()?;
    let response = dispatch::<ChatTurn>(state.agent.as_ref(), &req).await?;
    Ok(Json(response))
}
