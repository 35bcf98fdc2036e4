use thiserror::Error;

/// Errors from repository operations (used by trait definitions in despedida-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("session id '{0}' already exists")]
    SlugConflict(String),

    #[error("invalid session name: {0}")]
    InvalidName(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to message operations.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("session not found")]
    SessionNotFound,

    #[error("message text cannot be empty")]
    EmptyText,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,
}
