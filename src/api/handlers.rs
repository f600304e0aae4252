//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, SessionListResponse, SessionResponse,
    SessionSummary, SuccessResponse,
};
use super::AppState;
use crate::runtime::{SessionHandle, SseEvent};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/stream", get(stream_session))
        .route("/api/sessions/:id/delete", post(delete_session))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let handle = state.sessions.create_session().await;
    Json(SessionResponse::new(&handle, &handle.snapshot()))
}

async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    let sessions = state
        .sessions
        .list()
        .await
        .iter()
        .map(|handle| {
            let snapshot = handle.snapshot();
            SessionSummary {
                id: handle.id.clone(),
                created_at: handle.created_at,
                turn_count: snapshot.turns.len(),
                thinking: snapshot.thinking,
            }
        })
        .collect();

    Json(SessionListResponse { sessions })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = find_session(&state, &id).await?;
    Ok(Json(SessionResponse::new(&handle, &handle.snapshot())))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .sessions
        .remove(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))?;

    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// User Actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let handle = find_session(&state, &id).await?;
    handle.submit(req.text).await.map_err(AppError::Internal)?;

    Ok(Json(ChatResponse { queued: true }))
}

// ============================================================
// Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let handle = find_session(&state, &id).await?;

    let (snapshot, broadcast_rx) = handle.subscribe();
    let init = SseEvent::Init {
        turns: snapshot.turns,
        thinking: snapshot.thinking,
    };

    Ok(sse_stream(init, broadcast_rx).into_response())
}

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

async fn find_session(state: &AppState, id: &str) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
