use std::path::{Path, PathBuf};

use anyhow::Result;

/// Directory under the root that holds one subdirectory per session.
pub const BRAIN_DIR: &str = "brain";

/// Reserved subdirectory of `brain/` for bookkeeping (the known-project
/// registry). Never listed as a session.
pub const REGISTRY_DIR: &str = "_registry";

/// The four tracked artifact files inside a session directory.
pub const TASK_FILE: &str = "task.md";
pub const WALKTHROUGH_FILE: &str = "walkthrough.md";
pub const PLAN_FILE: &str = "implementation_plan.md";
pub const NOTES_FILE: &str = "session_notes.md";

/// Where all memory lives on disk. Built once at startup and threaded into
/// every component; there is no ambient global root.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    pub root: PathBuf,
}

impl MemoryConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default root under the platform data directory.
    pub fn default_root() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "memento")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn brain_dir(&self) -> PathBuf {
        self.root.join(BRAIN_DIR)
    }

    pub fn registry_dir(&self) -> PathBuf {
        self.brain_dir().join(REGISTRY_DIR)
    }

    pub fn session_dir(&self, session_id: &str) -> PathBuf {
        self.brain_dir().join(session_id)
    }

    pub fn journal_path(&self, session_id: &str) -> PathBuf {
        self.session_dir(session_id).join(NOTES_FILE)
    }

    pub fn backups_dir(&self, session_id: &str) -> PathBuf {
        self.session_dir(session_id).join(".backups")
    }
}

/// Session IDs are opaque directory-name tokens: ASCII alphanumerics plus
/// `.`, `_`, `-`, no leading dot. Anything else is rejected before any
/// filesystem access.
pub fn validate_session_id(id: &str) -> crate::error::Result<()> {
    let valid = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid {
        return Err(crate::error::MemoryError::Validation(format!(
            "invalid session id '{}'",
            id
        )));
    }
    Ok(())
}

/// Project paths must be absolute so the vault file location is unambiguous.
pub fn validate_project_path(path: &str) -> crate::error::Result<PathBuf> {
    let p = Path::new(path);
    if !p.is_absolute() {
        return Err(crate::error::MemoryError::Validation(format!(
            "project path must be absolute, got '{}'",
            path
        )));
    }
    Ok(p.to_path_buf())
}
