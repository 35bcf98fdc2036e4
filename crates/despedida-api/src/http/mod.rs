//! HTTP/REST API layer for despedida.
//!
//! Axum-based REST API at `/api/v1/` with bearer-token admin authentication
//! and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
