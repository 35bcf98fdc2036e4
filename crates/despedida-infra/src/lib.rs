//! Infrastructure layer for despedida.
//!
//! Contains implementations of the ports defined in `despedida-core`:
//! SQLite storage via sqlx and the static-secret admin authenticator.

pub mod auth;
pub mod sqlite;
