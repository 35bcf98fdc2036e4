//! Admin statistics endpoint.
//!
//! GET /api/v1/admin/stats - Aggregate report over all sessions and messages.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use despedida_core::repository::FarewellRepository;
use despedida_core::stats::{self, StatsReport};
use despedida_types::message::Message;

use crate::http::error::AppError;
use crate::http::extractors::auth::AdminAuthenticated;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsReport,
    pub generated_at: DateTime<Utc>,
}

/// GET /api/v1/admin/stats - Aggregate report.
///
/// Recomputed from the full collections on every call, nothing cached. A
/// failed fetch is a 500 rather than a report of misleading zeros.
pub async fn get_stats(
    State(state): State<AppState>,
    _auth: AdminAuthenticated,
) -> Result<Json<StatsResponse>, AppError> {
    let repo = state.farewell_service.repo();

    let sessions = repo
        .list_sessions()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let messages: Vec<Message> = repo
        .list_all_messages()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .into_iter()
        .map(|joined| joined.message)
        .collect();

    let now = Utc::now();
    let stats = stats::stats_report(&sessions, &messages, now);

    Ok(Json(StatsResponse {
        success: true,
        stats,
        generated_at: now,
    }))
}
