use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::{ChatMessageRequest, PageParams, SearchParams};
use crate::server::response::{
    ApiError, SEARCH_LIMIT, StoreOptionExt, StoreResultExt, page_window,
};
use crate::server::validation::validate_chat_message;
use crate::types::ChatMessage;

use super::access::require_moderator;

fn list(
    state: &AppState,
    offset: Option<i64>,
    limit: Option<i64>,
) -> Result<Vec<ChatMessage>, ApiError> {
    let (offset, limit) = page_window(offset, limit, state.config.max_page_size)?;
    state
        .store
        .list_chat_messages(offset, limit)
        .api_err("Failed to list chat messages")
}

pub async fn list_messages(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let messages = list(&state, params.offset, params.limit)?;
    Ok::<_, ApiError>(Json(messages))
}

pub async fn list_messages_page(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((offset, limit)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let messages = list(&state, Some(offset), Some(limit))?;
    Ok::<_, ApiError>(Json(messages))
}

pub async fn search_messages(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let messages = state
        .store
        .search_chat_messages(query, SEARCH_LIMIT)
        .api_err("Failed to search chat messages")?;

    Ok::<_, ApiError>(Json(messages))
}

pub async fn get_message(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let message = state
        .store
        .get_chat_message(id)
        .api_err("Failed to get chat message")?
        .or_not_found("Chat message not found")?;

    Ok::<_, ApiError>(Json(message))
}

pub async fn create_message(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatMessageRequest>,
) -> impl IntoResponse {
    validate_chat_message(&req.nickname, &req.message)?;

    let mut message = ChatMessage {
        id: 0,
        nickname: req.nickname,
        message: req.message,
        timestamp: Some(Utc::now()),
    };

    message.id = state
        .store
        .create_chat_message(&message)
        .api_err("Failed to create chat message")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(message)))
}

// Chat messages carry no owner, so edits are reserved to moderators.
pub async fn update_message(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ChatMessageRequest>,
) -> impl IntoResponse {
    require_moderator(&session)?;
    validate_chat_message(&req.nickname, &req.message)?;

    let store = state.store.as_ref();
    let mut message = store
        .get_chat_message(id)
        .api_err("Failed to get chat message")?
        .or_not_found("Chat message not found")?;

    message.nickname = req.nickname;
    message.message = req.message;
    store
        .update_chat_message(&message)
        .api_err("Failed to update chat message")?;

    Ok::<_, ApiError>(Json(message))
}

pub async fn delete_message(
    RequireAuth(session): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    require_moderator(&session)?;

    if !state
        .store
        .delete_chat_message(id)
        .api_err("Failed to delete chat message")?
    {
        return Err(ApiError::not_found("Chat message not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
