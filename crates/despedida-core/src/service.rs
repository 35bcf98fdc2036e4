//! Farewell service orchestrating session lifecycle and message ingestion.
//!
//! Enforces the cross-entity invariants before delegating to the repository:
//! a message is only accepted for an existing session, session "deletes" are
//! soft (active = false), and the single fixed event session is bootstrapped
//! idempotently.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use despedida_types::error::{MessageError, RepositoryError, SessionError};
use despedida_types::message::{
    ANONYMOUS_AUTHOR, MAX_AUTHOR_CHARS, MAX_TEXT_CHARS, MAX_TIP_CHARS, Message, NO_TIP_LABEL,
};
use despedida_types::session::{Session, SessionPatch, slugify};

use crate::repository::FarewellRepository;

/// Slug of the single fixed event session the public flow runs against.
pub const FIXED_SESSION_ID: &str = "martin-isi";
/// Display name of the fixed event session.
pub const FIXED_SESSION_NAME: &str = "Martin & Isi - USA Farewell";

/// A freshly persisted message together with the session's re-fetched total.
#[derive(Debug, Clone)]
pub struct SubmittedMessage {
    pub message: Message,
    pub total_messages: u64,
}

/// A session joined with its message statistics for the admin listing.
#[derive(Debug, Clone)]
pub struct SessionWithStats {
    pub session: Session,
    pub message_count: u64,
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Orchestrates session lifecycle and message persistence.
///
/// Generic over `FarewellRepository` to maintain clean architecture
/// (despedida-core never depends on despedida-infra). Holds no mutable
/// state of its own: every call is a short-lived round trip to the store.
pub struct FarewellService<R: FarewellRepository> {
    repo: R,
}

impl<R: FarewellRepository> FarewellService<R> {
    /// Create a new service over the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Access the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // --- Session lifecycle ---

    /// Return the session with the given id, creating it with the default
    /// name when absent.
    ///
    /// Concurrent callers may race on the insert; exactly one succeeds and
    /// the losers absorb the conflict by re-reading the winner's row.
    pub async fn ensure_session(
        &self,
        id: &str,
        default_name: &str,
    ) -> Result<Session, SessionError> {
        if let Some(existing) = self.repo.get_session(id).await.map_err(storage)? {
            return Ok(existing);
        }

        let session = Session {
            id: id.to_string(),
            name: default_name.to_string(),
            active: true,
            created_at: Utc::now(),
        };

        match self.repo.create_session(&session).await {
            Ok(created) => {
                info!(session_id = %id, "Session bootstrapped");
                Ok(created)
            }
            Err(RepositoryError::Conflict(_)) => {
                // Lost the creation race: another caller inserted the row first.
                warn!(session_id = %id, "Session bootstrap raced, re-reading");
                self.repo
                    .get_session(id)
                    .await
                    .map_err(storage)?
                    .ok_or(SessionError::NotFound)
            }
            Err(e) => Err(storage(e)),
        }
    }

    /// Create a session from an admin request.
    ///
    /// When no explicit id is given the slug is derived from the name and
    /// made unique with `-2`, `-3`... suffixes. An explicit id that collides
    /// is a conflict, never auto-suffixed.
    pub async fn create_session(
        &self,
        name: &str,
        explicit_id: Option<&str>,
    ) -> Result<Session, SessionError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(SessionError::InvalidName("name cannot be empty".to_string()));
        }

        let id = match explicit_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let base = slugify(&name);
                if base.is_empty() {
                    return Err(SessionError::InvalidName(
                        "name must contain at least one alphanumeric character".to_string(),
                    ));
                }
                self.ensure_unique_slug(&base).await?
            }
        };

        let session = Session {
            id: id.clone(),
            name,
            active: true,
            created_at: Utc::now(),
        };

        let created = self.repo.create_session(&session).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => SessionError::SlugConflict(id.clone()),
            other => storage(other),
        })?;

        info!(session_id = %created.id, "Session created");
        Ok(created)
    }

    /// Ensure a slug is unique by appending -2, -3, etc. if needed.
    async fn ensure_unique_slug(&self, base_slug: &str) -> Result<String, SessionError> {
        let mut slug = base_slug.to_string();
        let mut counter = 2;

        loop {
            let existing = self.repo.get_session(&slug).await.map_err(storage)?;
            if existing.is_none() {
                return Ok(slug);
            }

            slug = format!("{base_slug}-{counter}");
            counter += 1;

            // Safety valve: prevent infinite loops
            if counter > 100 {
                return Err(SessionError::SlugConflict(format!(
                    "could not generate unique slug from '{base_slug}'"
                )));
            }
        }
    }

    /// Update a session's display name. Blank names are rejected.
    pub async fn rename_session(&self, id: &str, name: &str) -> Result<Session, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidName("name cannot be empty".to_string()));
        }
        self.apply_patch(
            id,
            &SessionPatch {
                name: Some(name.to_string()),
                active: None,
            },
        )
        .await
    }

    /// Toggle a session's active flag. Messages are untouched.
    pub async fn set_session_active(
        &self,
        id: &str,
        active: bool,
    ) -> Result<Session, SessionError> {
        let session = self
            .apply_patch(
                id,
                &SessionPatch {
                    name: None,
                    active: Some(active),
                },
            )
            .await?;
        info!(session_id = %id, active, "Session active flag updated");
        Ok(session)
    }

    /// Soft-delete a session. The row and its messages stay in the store.
    pub async fn deactivate_session(&self, id: &str) -> Result<Session, SessionError> {
        self.set_session_active(id, false).await
    }

    /// Admin partial update: name and/or active flag in one call.
    pub async fn update_session(
        &self,
        id: &str,
        name: Option<&str>,
        active: Option<bool>,
    ) -> Result<Session, SessionError> {
        let name = match name {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(SessionError::InvalidName("name cannot be empty".to_string()));
                }
                Some(name.to_string())
            }
            None => None,
        };
        self.apply_patch(id, &SessionPatch { name, active }).await
    }

    async fn apply_patch(&self, id: &str, patch: &SessionPatch) -> Result<Session, SessionError> {
        match self.repo.update_session(id, patch).await {
            Ok(session) => Ok(session),
            Err(RepositoryError::NotFound) => Err(SessionError::NotFound),
            Err(e) => Err(storage(e)),
        }
    }

    /// A session together with its messages, for the public session view.
    pub async fn session_with_messages(
        &self,
        id: &str,
    ) -> Result<(Session, Vec<Message>), SessionError> {
        let session = self
            .repo
            .get_session(id)
            .await
            .map_err(storage)?
            .ok_or(SessionError::NotFound)?;
        let messages = self.repo.list_messages(id).await.map_err(storage)?;
        Ok((session, messages))
    }

    /// All sessions joined with message counts and last-message timestamps.
    pub async fn list_sessions_with_stats(&self) -> Result<Vec<SessionWithStats>, SessionError> {
        let sessions = self.repo.list_sessions().await.map_err(storage)?;
        let stats = self.repo.session_message_stats().await.map_err(storage)?;

        let by_id: HashMap<&str, _> = stats
            .iter()
            .map(|s| (s.session_id.as_str(), s))
            .collect();

        Ok(sessions
            .into_iter()
            .map(|session| {
                let stat = by_id.get(session.id.as_str());
                SessionWithStats {
                    message_count: stat.map_or(0, |s| s.message_count),
                    last_message_at: stat.map(|s| s.last_message_at),
                    session,
                }
            })
            .collect())
    }

    // --- Message ingestion ---

    /// Accept a farewell message for an existing session.
    ///
    /// The session must already exist -- ingestion never auto-creates it.
    /// Inputs are trimmed and clipped; an empty text after trimming is
    /// rejected before anything is written.
    pub async fn submit_message(
        &self,
        session_id: &str,
        author: Option<&str>,
        text: &str,
        tip: Option<&str>,
    ) -> Result<SubmittedMessage, MessageError> {
        let session = self
            .repo
            .get_session(session_id)
            .await
            .map_err(|e| MessageError::StorageError(e.to_string()))?
            .ok_or(MessageError::SessionNotFound)?;

        let text = sanitize_text(text)?;
        let author = sanitize_author(author);
        let tip = sanitize_tip(tip);

        let message = Message {
            id: Uuid::now_v7(),
            session_id: session.id.clone(),
            author,
            text,
            tip,
            created_at: Utc::now(),
        };

        self.repo
            .create_message(&message)
            .await
            .map_err(|e| MessageError::StorageError(e.to_string()))?;

        // Re-fetched rather than tracked locally. A count failure after a
        // successful insert must not fail the submission; the one message
        // just written is the floor.
        let total_messages = match self.repo.count_messages(&session.id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Message count unavailable after insert");
                1
            }
        };

        info!(message_id = %message.id, session_id = %session.id, "Message saved");

        Ok(SubmittedMessage {
            message,
            total_messages,
        })
    }

    /// Hard-delete one message. Succeeds even when the id is already gone.
    pub async fn delete_message(&self, id: &Uuid) -> Result<(), MessageError> {
        self.repo
            .delete_message(id)
            .await
            .map_err(|e| MessageError::StorageError(e.to_string()))?;
        info!(message_id = %id, "Message deleted");
        Ok(())
    }
}

fn storage(e: RepositoryError) -> SessionError {
    SessionError::StorageError(e.to_string())
}

/// Trimmed author, `Anónimo` when blank, clipped to 50 characters.
fn sanitize_author(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(author) => clip_chars(author, MAX_AUTHOR_CHARS).to_string(),
        None => ANONYMOUS_AUTHOR.to_string(),
    }
}

/// Trimmed text clipped to 500 characters; empty after trimming is an error.
fn sanitize_text(raw: &str) -> Result<String, MessageError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(MessageError::EmptyText);
    }
    Ok(clip_chars(text, MAX_TEXT_CHARS).to_string())
}

/// Tip label, `Sin propina` when blank, clipped to 50 characters.
fn sanitize_tip(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(tip) => clip_chars(tip, MAX_TIP_CHARS).to_string(),
        None => NO_TIP_LABEL.to_string(),
    }
}

/// Clip to at most `max` characters, on a char boundary.
fn clip_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
