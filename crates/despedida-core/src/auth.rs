//! Authenticator port for the admin surface.

use despedida_types::error::AuthError;

/// Capability check guarding the admin endpoints.
///
/// The static-secret implementation lives in despedida-infra; keeping the
/// trait here lets the scheme be swapped for a real credential store later
/// without touching any caller. Object-safe so application state can hold
/// it as a trait object.
pub trait Authenticator: Send + Sync {
    /// Whether a presented bearer token grants admin access.
    fn verify_token(&self, token: &str) -> bool;

    /// Exchange the admin password for a bearer token.
    fn issue_token(&self, password: &str) -> Result<String, AuthError>;
}
