use serde::{Deserialize, Serialize};

/// Snapshot of what the store currently holds, for `get_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStatus {
    pub root: String,
    pub session_count: usize,
    pub note_entries: usize,
    pub known_projects: usize,
    pub latest_session: Option<LatestSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestSession {
    pub id: String,
    pub title: String,
    pub date: String,
}
