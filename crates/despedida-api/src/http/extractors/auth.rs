//! Admin bearer-token extractor.
//!
//! Extracts the token from `Authorization: Bearer <token>` and verifies it
//! through the `Authenticator` port held in application state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated admin marker. Extracting this validates the bearer token.
pub struct AdminAuthenticated;

impl FromRequestParts<AppState> for AdminAuthenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        if state.authenticator.verify_token(token) {
            Ok(AdminAuthenticated)
        } else {
            Err(AppError::Unauthorized("Invalid admin token".to_string()))
        }
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn extract_bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts.headers.get("authorization").ok_or_else(|| {
        AppError::Unauthorized(
            "Missing credentials. Provide 'Authorization: Bearer <token>'.".to_string(),
        )
    })?;

    let value = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header encoding".to_string()))?;

    value.strip_prefix("Bearer ").map(str::trim).ok_or_else(|| {
        AppError::Unauthorized("Authorization header must use the Bearer scheme".to_string())
    })
}
