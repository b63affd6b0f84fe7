use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded work session, identified by its directory name.
///
/// Sessions qualify for listing only when at least one of the task,
/// walkthrough, or plan artifacts has non-whitespace content. A session
/// that holds only a note journal is reachable through note search but is
/// never listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Opaque directory-name token.
    pub id: String,
    /// Directory modification time; listing is sorted by this, newest first.
    pub modified: DateTime<Utc>,
    /// Derived from the task artifact, falling back to the plan.
    pub title: String,
}

/// The four tracked markdown documents of a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Task,
    Walkthrough,
    Plan,
    Notes,
}

impl ArtifactKind {
    /// All kinds, in display order.
    pub const ALL: [ArtifactKind; 4] = [Self::Task, Self::Walkthrough, Self::Plan, Self::Notes];

    /// Kinds whose content qualifies a session for listing. Notes do not.
    pub const QUALIFYING: [ArtifactKind; 3] = [Self::Task, Self::Walkthrough, Self::Plan];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Task => crate::config::TASK_FILE,
            Self::Walkthrough => crate::config::WALKTHROUGH_FILE,
            Self::Plan => crate::config::PLAN_FILE,
            Self::Notes => crate::config::NOTES_FILE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Walkthrough => "walkthrough",
            Self::Plan => "plan",
            Self::Notes => "notes",
        }
    }
}
