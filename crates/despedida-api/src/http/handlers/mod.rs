//! HTTP request handlers for the REST API.

use serde::Serialize;

pub mod admin;
pub mod message;
pub mod session;
pub mod stats;

/// Minimal acknowledgement body for delete-style endpoints.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
