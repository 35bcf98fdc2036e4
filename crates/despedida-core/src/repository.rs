//! FarewellRepository trait definition.
//!
//! The persistence gateway contract: CRUD for sessions and messages against
//! the backing store. Store errors surface unchanged in the error payload;
//! absence on reads is `None`, never an error.

use chrono::{DateTime, Utc};
use despedida_types::error::RepositoryError;
use despedida_types::message::{Message, MessageWithSession};
use despedida_types::session::{Session, SessionPatch};
use uuid::Uuid;

/// Message count and latest timestamp for one session, as produced by the
/// grouped statistics query. Sessions without messages have no entry.
#[derive(Debug, Clone)]
pub struct SessionMessageStat {
    pub session_id: String,
    pub message_count: u64,
    pub last_message_at: DateTime<Utc>,
}

/// Repository trait for session and message persistence.
///
/// Implementations live in despedida-infra (e.g., `SqliteFarewellRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait FarewellRepository: Send + Sync {
    /// Insert a new session. Fails with `Conflict` when the id is taken.
    fn create_session(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<Session, RepositoryError>> + Send;

    /// Get a session by its slug.
    fn get_session(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Session>, RepositoryError>> + Send;

    /// Merge the patch fields into an existing session and return the
    /// updated row. Fails with `NotFound` when no row matches.
    fn update_session(
        &self,
        id: &str,
        patch: &SessionPatch,
    ) -> impl std::future::Future<Output = Result<Session, RepositoryError>> + Send;

    /// List all sessions, ordered by created_at DESC.
    fn list_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Session>, RepositoryError>> + Send;

    /// Insert a new message. The referenced session must exist (the store
    /// enforces the foreign key).
    fn create_message(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Messages for one session, ordered by created_at ASC.
    fn list_messages(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Every message across sessions, joined with the owning session's
    /// id and name, ordered by created_at DESC.
    fn list_all_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<MessageWithSession>, RepositoryError>> + Send;

    /// Hard-delete one message. Idempotent: deleting an absent id succeeds.
    fn delete_message(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Number of messages in one session.
    fn count_messages(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Message count and latest timestamp per session, for every session
    /// that has at least one message.
    fn session_message_stats(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<SessionMessageStat>, RepositoryError>> + Send;
}
