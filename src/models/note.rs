use serde::{Deserialize, Serialize};

/// One entry in a session's append-only note journal.
///
/// Entries are ordered by append order within a session and are never
/// mutated or deleted by normal operation. The timestamp is minute
/// precision; together with the body it is the identity used for
/// duplicate detection on import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteEntry {
    /// `YYYY-MM-DDTHH:MM`, local time at append.
    pub timestamp: String,
    /// Optional tag token, stored as a literal `#tag` marker in the header.
    pub tag: Option<String>,
    pub body: String,
}

/// A note search hit, annotated with the session it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteMatch {
    pub session_id: String,
    pub session_title: String,
    pub session_date: String,
    pub entry: NoteEntry,
}
