//! Session directory enumeration and recency ranking.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::{MemoryConfig, REGISTRY_DIR};
use crate::error::Result;
use crate::models::{ArtifactKind, SessionSummary};

use super::artifacts;

/// List qualifying sessions, newest first.
///
/// A session qualifies when any of its task, walkthrough, or plan artifacts
/// has non-whitespace content; a note journal alone does not. A missing
/// session root is the normal empty-memory state and yields an empty vec.
pub fn list_sessions(config: &MemoryConfig) -> Result<Vec<SessionSummary>> {
    let brain = config.brain_dir();
    if !brain.exists() {
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    for entry in fs::read_dir(&brain)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(id) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if id == REGISTRY_DIR {
            continue;
        }
        if !has_artifacts(&path) {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        sessions.push(SessionSummary {
            id: id.to_string(),
            modified,
            title: artifacts::title(&path),
        });
    }

    sessions.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(sessions)
}

/// Whether any qualifying artifact has non-whitespace content.
fn has_artifacts(session_dir: &Path) -> bool {
    ArtifactKind::QUALIFYING.iter().any(|kind| {
        fs::read_to_string(session_dir.join(kind.file_name()))
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    })
}
