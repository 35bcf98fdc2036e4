//! Message types: the individual farewell entries, plus sanitization limits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum stored length of an author name, in characters.
pub const MAX_AUTHOR_CHARS: usize = 50;
/// Maximum stored length of a message text, in characters.
pub const MAX_TEXT_CHARS: usize = 500;
/// Maximum stored length of a tip label, in characters.
pub const MAX_TIP_CHARS: usize = 50;

/// Author recorded when a visitor leaves the name field blank.
pub const ANONYMOUS_AUTHOR: &str = "Anónimo";
/// Tip label recorded when a visitor picks none.
pub const NO_TIP_LABEL: &str = "Sin propina";

/// A single farewell entry within a session.
///
/// Messages are insert-only: created once, never updated, and only ever
/// removed by an admin hard-delete. `created_at` drives all chronological
/// ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub session_id: String,
    pub author: String,
    pub text: String,
    /// Mock tip label ("20%", "Sin propina", ...), purely decorative.
    pub tip: String,
    pub created_at: DateTime<Utc>,
}

/// Minimal session info carried alongside cross-session message listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRef {
    pub id: String,
    pub name: String,
}

/// A message joined with its owning session, as returned by the
/// all-messages listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageWithSession {
    #[serde(flatten)]
    pub message: Message,
    pub session: SessionRef,
}

/// Wire shape for the public message submission endpoint.
///
/// Presence of `sessionId` and `text` is validated at the API edge; the
/// service handles trimming, clipping, and the anonymous/no-tip defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageRequest {
    pub session_id: Option<String>,
    pub author: Option<String>,
    pub text: Option<String>,
    pub tip: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialize() {
        let message = Message {
            id: Uuid::now_v7(),
            session_id: "martin-isi".to_string(),
            author: ANONYMOUS_AUTHOR.to_string(),
            text: "¡Buen viaje!".to_string(),
            tip: "20%".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"author\":\"Anónimo\""));
        assert!(json.contains("\"session_id\":\"martin-isi\""));
    }

    #[test]
    fn test_message_with_session_flattens() {
        let joined = MessageWithSession {
            message: Message {
                id: Uuid::now_v7(),
                session_id: "martin-isi".to_string(),
                author: "Ana".to_string(),
                text: "Suerte".to_string(),
                tip: NO_TIP_LABEL.to_string(),
                created_at: Utc::now(),
            },
            session: SessionRef {
                id: "martin-isi".to_string(),
                name: "Martin & Isi - USA Farewell".to_string(),
            },
        };
        let value = serde_json::to_value(&joined).unwrap();
        // message fields sit at the top level, the session ref is nested
        assert_eq!(value["author"], "Ana");
        assert_eq!(value["session"]["name"], "Martin & Isi - USA Farewell");
    }

    #[test]
    fn test_submit_request_camel_case() {
        let req: SubmitMessageRequest = serde_json::from_str(
            r#"{"sessionId":"martin-isi","author":"Ana","text":"Good luck!","tip":"20%"}"#,
        )
        .unwrap();
        assert_eq!(req.session_id.as_deref(), Some("martin-isi"));
        assert_eq!(req.tip.as_deref(), Some("20%"));
    }
}
