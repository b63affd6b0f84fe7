//! Heuristic project scoping for sessions.
//!
//! This is an advisory relevance filter, not a security boundary: matching
//! is plain substring containment, so short or common project names can
//! produce false positives. That permissiveness is intentional.

use std::path::Path;

use crate::models::ArtifactKind;

use super::artifacts;

/// Whether a session's text mentions the given project.
///
/// No filter matches everything. Otherwise the project path is normalized
/// (forward slashes, no trailing slash, lowercase) and the session matches
/// if any of its task, plan, or walkthrough content contains either the
/// full normalized path or the bare final path segment.
pub fn matches(session_dir: &Path, project_filter: Option<&str>) -> bool {
    let Some(filter) = project_filter else {
        return true;
    };

    let full = normalize(filter);
    let name = full.rsplit('/').next().unwrap_or(&full).to_string();

    ArtifactKind::QUALIFYING.iter().any(|kind| {
        artifacts::read_artifact(session_dir, *kind)
            .map(|content| {
                let haystack = content.to_lowercase();
                haystack.contains(&full) || haystack.contains(&name)
            })
            .unwrap_or(false)
    })
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
        .trim_end_matches('/')
        .to_lowercase()
}
