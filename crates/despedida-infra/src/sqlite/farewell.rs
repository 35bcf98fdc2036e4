//! SQLite farewell repository implementation.
//!
//! Implements `FarewellRepository` from `despedida-core` using sqlx with the
//! split read/write pools: raw queries, private Row structs for row-to-domain
//! mapping, reader pool for SELECTs, writer pool for mutations.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use uuid::Uuid;

use despedida_core::repository::{FarewellRepository, SessionMessageStat};
use despedida_types::error::RepositoryError;
use despedida_types::message::{Message, MessageWithSession, SessionRef};
use despedida_types::session::{Session, SessionPatch};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `FarewellRepository`.
pub struct SqliteFarewellRepository {
    pool: DatabasePool,
}

impl SqliteFarewellRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    id: String,
    name: String,
    active: bool,
    created_at: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_session(self) -> Result<Session, RepositoryError> {
        Ok(Session {
            id: self.id,
            name: self.name,
            active: self.active,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct MessageRow {
    id: String,
    session_id: String,
    author: String,
    text: String,
    tip: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            author: row.try_get("author")?,
            text: row.try_get("text")?,
            tip: row.try_get("tip")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(Message {
            id,
            session_id: self.session_id,
            author: self.author,
            text: self.text,
            tip: self.tip,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so the TEXT column sorts chronologically.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

fn map_session_insert_error(id: &str, e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(format!("session '{id}' already exists"))
        }
        _ => query_error(e),
    }
}

// ---------------------------------------------------------------------------
// FarewellRepository implementation
// ---------------------------------------------------------------------------

impl FarewellRepository for SqliteFarewellRepository {
    async fn create_session(&self, session: &Session) -> Result<Session, RepositoryError> {
        sqlx::query("INSERT INTO sessions (id, name, active, created_at) VALUES (?, ?, ?, ?)")
            .bind(&session.id)
            .bind(&session.name)
            .bind(session.active)
            .bind(format_datetime(&session.created_at))
            .execute(&self.pool.writer)
            .await
            .map_err(|e| map_session_insert_error(&session.id, e))?;

        Ok(session.clone())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let session_row = SessionRow::from_row(&row).map_err(query_error)?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update_session(
        &self,
        id: &str,
        patch: &SessionPatch,
    ) -> Result<Session, RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE sessions
               SET name = COALESCE(?, name), active = COALESCE(?, active)
               WHERE id = ?"#,
        )
        .bind(&patch.name)
        .bind(patch.active)
        .bind(id)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_session(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM sessions ORDER BY created_at DESC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row = SessionRow::from_row(row).map_err(query_error)?;
            sessions.push(session_row.into_session()?);
        }

        Ok(sessions)
    }

    async fn create_message(&self, message: &Message) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO messages (id, session_id, author, text, tip, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(&message.session_id)
        .bind(&message.author)
        .bind(&message.text)
        .bind(&message.tip)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM messages WHERE session_id = ? ORDER BY created_at ASC")
                .bind(session_id)
                .fetch_all(&self.pool.reader)
                .await
                .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let message_row = MessageRow::from_row(row).map_err(query_error)?;
            messages.push(message_row.into_message()?);
        }

        Ok(messages)
    }

    async fn list_all_messages(&self) -> Result<Vec<MessageWithSession>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT m.id, m.session_id, m.author, m.text, m.tip, m.created_at,
                      s.name AS session_name
               FROM messages m
               JOIN sessions s ON s.id = m.session_id
               ORDER BY m.created_at DESC"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_name: String = row.try_get("session_name").map_err(query_error)?;
            let message = MessageRow::from_row(row)
                .map_err(query_error)?
                .into_message()?;
            let session = SessionRef {
                id: message.session_id.clone(),
                name: session_name,
            };
            messages.push(MessageWithSession { message, session });
        }

        Ok(messages)
    }

    async fn delete_message(&self, id: &Uuid) -> Result<(), RepositoryError> {
        // Idempotent: zero affected rows is a success, not NotFound.
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(())
    }

    async fn count_messages(&self, session_id: &str) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM messages WHERE session_id = ?")
            .bind(session_id)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let count: i64 = row.try_get("cnt").map_err(query_error)?;

        Ok(count as u64)
    }

    async fn session_message_stats(&self) -> Result<Vec<SessionMessageStat>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT session_id, COUNT(*) as message_count, MAX(created_at) as last_message_at
               FROM messages
               GROUP BY session_id"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut stats = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_id: String = row.try_get("session_id").map_err(query_error)?;
            let message_count: i64 = row.try_get("message_count").map_err(query_error)?;
            let last_message_at: String = row.try_get("last_message_at").map_err(query_error)?;
            stats.push(SessionMessageStat {
                session_id,
                message_count: message_count as u64,
                last_message_at: parse_datetime(&last_message_at)?,
            });
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;
    use chrono::Duration;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    /// Whole-second timestamp so values survive the microsecond storage format.
    fn base_time() -> DateTime<Utc> {
        "2026-08-01T12:00:00Z".parse().unwrap()
    }

    fn make_session(id: &str, created_at: DateTime<Utc>) -> Session {
        Session {
            id: id.to_string(),
            name: format!("Despedida {id}"),
            active: true,
            created_at,
        }
    }

    fn make_message(session_id: &str, author: &str, created_at: DateTime<Utc>) -> Message {
        Message {
            id: Uuid::now_v7(),
            session_id: session_id.to_string(),
            author: author.to_string(),
            text: "Buen viaje".to_string(),
            tip: "20%".to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let repo = SqliteFarewellRepository::new(test_pool().await);

        let session = make_session("martin-isi", base_time());
        let created = repo.create_session(&session).await.unwrap();
        assert_eq!(created.id, "martin-isi");

        let found = repo.get_session("martin-isi").await.unwrap().unwrap();
        assert_eq!(found.name, session.name);
        assert!(found.active);
        assert_eq!(found.created_at, session.created_at);

        let missing = repo.get_session("nadie").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_create_session_conflict_on_duplicate_id() {
        let repo = SqliteFarewellRepository::new(test_pool().await);

        let session = make_session("martin-isi", base_time());
        repo.create_session(&session).await.unwrap();

        let err = repo.create_session(&session).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_session_merges_patch() {
        let repo = SqliteFarewellRepository::new(test_pool().await);
        repo.create_session(&make_session("martin-isi", base_time()))
            .await
            .unwrap();

        // Name only
        let updated = repo
            .update_session(
                "martin-isi",
                &SessionPatch {
                    name: Some("Nueva despedida".to_string()),
                    active: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Nueva despedida");
        assert!(updated.active);

        // Active only, name untouched
        let updated = repo
            .update_session(
                "martin-isi",
                &SessionPatch {
                    name: None,
                    active: Some(false),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Nueva despedida");
        assert!(!updated.active);

        // Soft delete keeps the row readable
        let found = repo.get_session("martin-isi").await.unwrap().unwrap();
        assert!(!found.active);
    }

    #[tokio::test]
    async fn test_update_session_unknown_id() {
        let repo = SqliteFarewellRepository::new(test_pool().await);
        let err = repo
            .update_session(
                "nadie",
                &SessionPatch {
                    name: None,
                    active: Some(false),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_sessions_newest_first() {
        let repo = SqliteFarewellRepository::new(test_pool().await);
        let base = base_time();
        repo.create_session(&make_session("vieja", base - Duration::days(2)))
            .await
            .unwrap();
        repo.create_session(&make_session("nueva", base))
            .await
            .unwrap();
        repo.create_session(&make_session("media", base - Duration::days(1)))
            .await
            .unwrap();

        let sessions = repo.list_sessions().await.unwrap();
        let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["nueva", "media", "vieja"]);
    }

    #[tokio::test]
    async fn test_messages_ordered_ascending_per_session() {
        let repo = SqliteFarewellRepository::new(test_pool().await);
        let base = base_time();
        repo.create_session(&make_session("martin-isi", base))
            .await
            .unwrap();

        repo.create_message(&make_message("martin-isi", "Beto", base + Duration::seconds(1)))
            .await
            .unwrap();
        repo.create_message(&make_message("martin-isi", "Ana", base))
            .await
            .unwrap();

        let messages = repo.list_messages("martin-isi").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].author, "Ana");
        assert_eq!(messages[1].author, "Beto");

        let count = repo.count_messages("martin-isi").await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_create_message_requires_existing_session() {
        let repo = SqliteFarewellRepository::new(test_pool().await);

        let err = repo
            .create_message(&make_message("fantasma", "Ana", base_time()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
    }

    #[tokio::test]
    async fn test_list_all_messages_joins_sessions_newest_first() {
        let repo = SqliteFarewellRepository::new(test_pool().await);
        let base = base_time();
        repo.create_session(&make_session("uno", base)).await.unwrap();
        repo.create_session(&make_session("dos", base)).await.unwrap();

        repo.create_message(&make_message("uno", "Ana", base))
            .await
            .unwrap();
        repo.create_message(&make_message("dos", "Beto", base + Duration::seconds(5)))
            .await
            .unwrap();

        let all = repo.list_all_messages().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].message.author, "Beto");
        assert_eq!(all[0].session.name, "Despedida dos");
        assert_eq!(all[1].session.id, "uno");
    }

    #[tokio::test]
    async fn test_delete_message_is_idempotent() {
        let repo = SqliteFarewellRepository::new(test_pool().await);
        repo.create_session(&make_session("martin-isi", base_time()))
            .await
            .unwrap();

        let message = make_message("martin-isi", "Ana", base_time());
        repo.create_message(&message).await.unwrap();

        repo.delete_message(&message.id).await.unwrap();
        assert_eq!(repo.count_messages("martin-isi").await.unwrap(), 0);

        // Second delete of the same id still succeeds
        repo.delete_message(&message.id).await.unwrap();

        // And so does deleting an id that never existed
        repo.delete_message(&Uuid::now_v7()).await.unwrap();
    }

    #[tokio::test]
    async fn test_session_message_stats_groups_and_maxes() {
        let repo = SqliteFarewellRepository::new(test_pool().await);
        let base = base_time();
        repo.create_session(&make_session("llena", base)).await.unwrap();
        repo.create_session(&make_session("vacia", base)).await.unwrap();

        let last = base + Duration::seconds(30);
        repo.create_message(&make_message("llena", "Ana", base))
            .await
            .unwrap();
        repo.create_message(&make_message("llena", "Beto", last))
            .await
            .unwrap();

        let stats = repo.session_message_stats().await.unwrap();
        assert_eq!(stats.len(), 1, "sessions without messages have no entry");
        assert_eq!(stats[0].session_id, "llena");
        assert_eq!(stats[0].message_count, 2);
        assert_eq!(stats[0].last_message_at, last);
    }
}
