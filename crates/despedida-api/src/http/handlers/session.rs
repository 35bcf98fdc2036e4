//! Public session endpoints.
//!
//! Endpoints:
//! - POST /api/v1/session                - Bootstrap the fixed event session
//! - GET  /api/v1/sessions/{id}          - Session with its messages
//! - GET  /api/v1/sessions/{id}/messages - Messages for one session

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use despedida_core::service::{FIXED_SESSION_ID, FIXED_SESSION_NAME};
use despedida_types::message::Message;
use despedida_types::session::Session;

use crate::http::error::AppError;
use crate::state::AppState;

/// A session flattened together with its messages and re-counted total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailResponse {
    #[serde(flatten)]
    pub session: Session,
    pub messages: Vec<Message>,
    pub total_messages: u64,
}

/// Message listing for one session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
    pub total_messages: u64,
}

/// POST /api/v1/session - Bootstrap the fixed event session.
///
/// Idempotent: returns the existing row on every call after the first.
pub async fn bootstrap_session(State(state): State<AppState>) -> Result<Json<Session>, AppError> {
    let session = state
        .farewell_service
        .ensure_session(FIXED_SESSION_ID, FIXED_SESSION_NAME)
        .await?;
    Ok(Json(session))
}

/// GET /api/v1/sessions/{id} - A session with its messages.
///
/// Deactivated sessions are still served; soft-delete never hides data here.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetailResponse>, AppError> {
    let (session, messages) = state
        .farewell_service
        .session_with_messages(&session_id)
        .await?;
    let total_messages = messages.len() as u64;

    Ok(Json(SessionDetailResponse {
        session,
        messages,
        total_messages,
    }))
}

/// GET /api/v1/sessions/{id}/messages - Messages for one session, oldest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<MessageListResponse>, AppError> {
    let (_, messages) = state
        .farewell_service
        .session_with_messages(&session_id)
        .await?;
    let total_messages = messages.len() as u64;

    Ok(Json(MessageListResponse {
        messages,
        total_messages,
    }))
}
