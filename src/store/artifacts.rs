//! Title derivation and artifact extraction for a session directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::models::ArtifactKind;

const TITLE_MAX: usize = 80;
const UNTITLED: &str = "Untitled session";

/// Derive a session title: the task file wins, the plan is the fallback.
///
/// Within the chosen text the first heading line (trimmed of `#` markers and
/// whitespace) is the title; otherwise the first non-blank line truncated to
/// 80 characters; otherwise a fixed placeholder.
pub fn title(session_dir: &Path) -> String {
    let text = read_artifact(session_dir, ArtifactKind::Task)
        .or_else(|| read_artifact(session_dir, ArtifactKind::Plan));
    let Some(text) = text else {
        return UNTITLED.to_string();
    };

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            let heading = trimmed.trim_start_matches('#').trim();
            if !heading.is_empty() {
                return heading.to_string();
            }
        }
    }

    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| l.chars().take(TITLE_MAX).collect())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Every non-empty artifact of the session, keyed by kind. Missing or empty
/// files are silently omitted.
pub fn full_artifacts(session_dir: &Path) -> BTreeMap<ArtifactKind, String> {
    ArtifactKind::ALL
        .iter()
        .filter_map(|kind| read_artifact(session_dir, *kind).map(|c| (*kind, c)))
        .collect()
}

/// Read one artifact; `None` when missing or whitespace-only.
pub fn read_artifact(session_dir: &Path, kind: ArtifactKind) -> Option<String> {
    let content = fs::read_to_string(session_dir.join(kind.file_name())).ok()?;
    if content.trim().is_empty() {
        None
    } else {
        Some(content)
    }
}
