//! Message submission and deletion endpoints.
//!
//! Endpoints:
//! - POST   /api/v1/messages             - Submit a farewell message
//! - DELETE /api/v1/admin/messages/{id}  - Hard-delete one message (admin)

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use despedida_types::message::{Message, SubmitMessageRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::AdminAuthenticated;
use crate::http::handlers::SuccessResponse;
use crate::state::AppState;

/// Body returned after a successful submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageResponse {
    pub success: bool,
    pub message_id: Uuid,
    pub total_messages: u64,
    pub data: Message,
}

/// POST /api/v1/messages - Submit a farewell message.
///
/// The session must already exist; submission never creates it.
pub async fn submit_message(
    State(state): State<AppState>,
    Json(body): Json<SubmitMessageRequest>,
) -> Result<(StatusCode, Json<SubmitMessageResponse>), AppError> {
    let session_id = body
        .session_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("sessionId is required".to_string()))?;
    let text = body
        .text
        .as_deref()
        .ok_or_else(|| AppError::Validation("text is required".to_string()))?;

    let submitted = state
        .farewell_service
        .submit_message(session_id, body.author.as_deref(), text, body.tip.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitMessageResponse {
            success: true,
            message_id: submitted.message.id,
            total_messages: submitted.total_messages,
            data: submitted.message,
        }),
    ))
}

/// DELETE /api/v1/admin/messages/{id} - Hard-delete one message.
///
/// Idempotent: deleting an already-absent id still reports success.
pub async fn delete_message(
    State(state): State<AppState>,
    _auth: AdminAuthenticated,
    Path(message_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.farewell_service.delete_message(&message_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
