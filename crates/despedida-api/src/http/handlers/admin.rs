//! Admin login and session management endpoints.
//!
//! Endpoints:
//! - POST   /api/v1/admin/login          - Exchange the admin password for a token
//! - GET    /api/v1/admin/sessions       - List sessions with message stats
//! - POST   /api/v1/admin/sessions       - Create a session
//! - PUT    /api/v1/admin/sessions       - Partial session update
//! - DELETE /api/v1/admin/sessions/{id}  - Deactivate (soft-delete) a session

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use despedida_types::session::{CreateSessionRequest, Session, UpdateSessionRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::AdminAuthenticated;
use crate::http::handlers::SuccessResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    /// Advisory for the frontend cookie; nothing expires server-side.
    pub expires_in: String,
}

/// A session with its message stats for the admin listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSessionEntry {
    #[serde(flatten)]
    pub session: Session,
    pub message_count: u64,
    pub last_message: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub success: bool,
    pub sessions: Vec<AdminSessionEntry>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: Session,
}

/// POST /api/v1/admin/login - Exchange the admin password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let password = body
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("password is required".to_string()))?;

    let token = state.authenticator.issue_token(password)?;
    tracing::info!("Admin login succeeded");

    Ok(Json(LoginResponse {
        success: true,
        token,
        expires_in: "24h".to_string(),
    }))
}

/// GET /api/v1/admin/sessions - All sessions with message counts.
pub async fn list_sessions(
    State(state): State<AppState>,
    _auth: AdminAuthenticated,
) -> Result<Json<SessionListResponse>, AppError> {
    let rows = state.farewell_service.list_sessions_with_stats().await?;

    let sessions: Vec<AdminSessionEntry> = rows
        .into_iter()
        .map(|row| AdminSessionEntry {
            session: row.session,
            message_count: row.message_count,
            last_message: row.last_message_at,
        })
        .collect();
    let total = sessions.len();

    Ok(Json(SessionListResponse {
        success: true,
        sessions,
        total,
    }))
}

/// POST /api/v1/admin/sessions - Create a session.
pub async fn create_session(
    State(state): State<AppState>,
    _auth: AdminAuthenticated,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let name = body
        .name
        .as_deref()
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;

    let session = state
        .farewell_service
        .create_session(name, body.id.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            success: true,
            session,
        }),
    ))
}

/// PUT /api/v1/admin/sessions - Update name and/or active flag.
pub async fn update_session(
    State(state): State<AppState>,
    _auth: AdminAuthenticated,
    Json(body): Json<UpdateSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session_id = body
        .session_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("sessionId is required".to_string()))?;

    let session = state
        .farewell_service
        .update_session(session_id, body.name.as_deref(), body.active)
        .await?;

    Ok(Json(SessionResponse {
        success: true,
        session,
    }))
}

/// DELETE /api/v1/admin/sessions/{id} - Deactivate a session.
///
/// Soft delete: the row and its messages survive with `active = false`.
pub async fn deactivate_session(
    State(state): State<AppState>,
    _auth: AdminAuthenticated,
    Path(session_id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.farewell_service.deactivate_session(&session_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
