//! Session types: the named farewell events that group messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named farewell event that groups messages.
///
/// The `id` is an external-facing slug (e.g. `martin-isi`) and never changes
/// once created. Sessions are soft-deleted: setting `active` to false keeps
/// the row and every message attached to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial update applied to an existing session.
///
/// `None` fields are left untouched. `id` and `created_at` are immutable.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub name: Option<String>,
    pub active: Option<bool>,
}

/// Wire shape for admin session creation.
///
/// Presence of `name` is validated at the API edge; when `id` is absent the
/// service derives a slug from the name.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub name: Option<String>,
    pub id: Option<String>,
}

/// Wire shape for admin session update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub session_id: Option<String>,
    pub name: Option<String>,
    pub active: Option<bool>,
}

/// Convert a display name into a URL-safe slug.
///
/// Lowercases, maps non-alphanumerics to hyphens, collapses runs, and trims
/// the edges.
///
/// ```
/// use despedida_types::session::slugify;
///
/// assert_eq!(slugify("Martin & Isi"), "martin-isi");
/// assert_eq!(slugify("  Gran  Despedida 2026!  "), "gran-despedida-2026");
/// assert_eq!(slugify("---hola---chao---"), "hola-chao");
/// ```
pub fn slugify(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();

    // Collapse consecutive hyphens and trim edges
    let mut result = String::with_capacity(slug.len());
    let mut prev_was_hyphen = true; // treat start as hyphen to trim leading
    for c in slug.chars() {
        if c == '-' {
            if !prev_was_hyphen {
                result.push('-');
            }
            prev_was_hyphen = true;
        } else {
            result.push(c);
            prev_was_hyphen = false;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}
