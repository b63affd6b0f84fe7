//! The memory store facade.
//!
//! [`MemoryStore`] is the single entry point the dispatcher talks to. It
//! owns the configuration and the in-process lock table and delegates to
//! the leaf components: session indexing, artifact reading, project
//! matching, the note journal, backups, the credential vault, and
//! export/import.

pub mod artifacts;
pub mod backup;
pub mod index;
pub mod journal;
pub mod matcher;
pub mod projects;
pub mod transfer;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::Local;

use crate::config::{validate_project_path, validate_session_id, MemoryConfig};
use crate::error::{MemoryError, Result};
use crate::locks::PathLocks;
use crate::models::*;
use crate::vault::{CredentialVault, VaultReadOutcome};

/// The most recent session together with its headline artifact.
#[derive(Debug, Clone)]
pub struct LatestTask {
    pub session: SessionSummary,
    /// Task content, falling back to the plan when the task is empty.
    pub content: String,
}

/// A fully recalled session: summary plus every non-empty artifact.
#[derive(Debug, Clone)]
pub struct FullSession {
    pub session: SessionSummary,
    pub artifacts: BTreeMap<ArtifactKind, String>,
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    config: MemoryConfig,
    locks: PathLocks,
    vault: CredentialVault,
}

impl MemoryStore {
    pub fn new(config: MemoryConfig) -> Self {
        let locks = PathLocks::new();
        let vault = CredentialVault::new(locks.clone());
        Self { config, locks, vault }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    // ============================================================
    // Session recall
    // ============================================================

    /// Qualifying sessions, newest first, optionally scoped to a project.
    pub fn list_recent_sessions(
        &self,
        count: usize,
        project_filter: Option<&str>,
    ) -> Result<Vec<SessionSummary>> {
        let sessions = index::list_sessions(&self.config)?;
        Ok(sessions
            .into_iter()
            .filter(|s| matcher::matches(&self.config.session_dir(&s.id), project_filter))
            .take(count)
            .collect())
    }

    /// The newest session's task (or plan) content. `None` when no session
    /// qualifies; absence of memory is not an error.
    pub fn recall_latest_task(&self) -> Result<Option<LatestTask>> {
        let sessions = index::list_sessions(&self.config)?;
        let Some(session) = sessions.into_iter().next() else {
            return Ok(None);
        };
        let dir = self.config.session_dir(&session.id);
        let content = artifacts::read_artifact(&dir, ArtifactKind::Task)
            .or_else(|| artifacts::read_artifact(&dir, ArtifactKind::Plan))
            .unwrap_or_default();
        Ok(Some(LatestTask { session, content }))
    }

    /// Everything recorded for one session. `None` for an unknown ID.
    pub fn recall_full_session(&self, session_id: &str) -> Result<Option<FullSession>> {
        validate_session_id(session_id)?;
        let dir = self.config.session_dir(session_id);
        if !dir.is_dir() {
            return Ok(None);
        }
        let found = artifacts::full_artifacts(&dir);
        let modified = fs::metadata(&dir)
            .and_then(|m| m.modified())
            .map(chrono::DateTime::<chrono::Utc>::from)
            .unwrap_or_else(|_| chrono::Utc::now());
        Ok(Some(FullSession {
            session: SessionSummary {
                id: session_id.to_string(),
                modified,
                title: artifacts::title(&dir),
            },
            artifacts: found,
        }))
    }

    // ============================================================
    // Notes
    // ============================================================

    /// Append a note. Without a session ID the note goes to the most recent
    /// session; with no sessions at all a fresh one is created.
    pub fn append_note(
        &self,
        note: &str,
        tag: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<(String, PathBuf)> {
        if note.trim().is_empty() {
            return Err(MemoryError::Validation("note body is empty".to_string()));
        }
        let session_id = match session_id {
            Some(id) => {
                validate_session_id(id)?;
                id.to_string()
            }
            None => match index::list_sessions(&self.config)?.into_iter().next() {
                Some(s) => s.id,
                None => format!("session-{}", Local::now().format("%Y%m%d-%H%M%S")),
            },
        };
        let path = journal::append(&self.config, &self.locks, &session_id, note, tag)?;
        Ok((session_id, path))
    }

    /// Conjunctive note search over the most recent `window` sessions.
    pub fn search_notes(
        &self,
        query: Option<&str>,
        tag: Option<&str>,
        window: usize,
    ) -> Result<Vec<NoteMatch>> {
        let sessions = index::list_sessions(&self.config)?;
        journal::search(&self.config, &sessions, query, tag, window)
    }

    // ============================================================
    // Projects & credentials
    // ============================================================

    pub fn list_known_projects(&self) -> Result<Vec<String>> {
        projects::known_projects(&self.config)
    }

    pub fn read_credentials(&self, project_path: &str) -> Result<VaultReadOutcome> {
        let path = validate_project_path(project_path)?;
        let outcome = self.vault.read(&path)?;
        if !matches!(outcome, VaultReadOutcome::Missing) {
            projects::remember_project(&self.config, &path)?;
        }
        Ok(outcome)
    }

    /// Write a credential record. The returned string, when present, is the
    /// `.gitignore` inconsistency warning; the vault write itself succeeded.
    pub fn write_credentials(
        &self,
        project_path: &str,
        record: &CredentialRecord,
    ) -> Result<Option<String>> {
        let path = validate_project_path(project_path)?;
        if !path.is_dir() {
            return Err(MemoryError::Validation(format!(
                "project directory does not exist: {}",
                project_path
            )));
        }
        let warning = self.vault.write(&path, record)?;
        projects::remember_project(&self.config, &path)?;
        Ok(warning)
    }

    /// Write the free-form project snapshot verbatim.
    pub fn write_context_file(&self, project_path: &str, text: &str) -> Result<PathBuf> {
        let path = validate_project_path(project_path)?;
        if !path.is_dir() {
            return Err(MemoryError::Validation(format!(
                "project directory does not exist: {}",
                project_path
            )));
        }
        let target = path.join(CONTEXT_FILE);
        fs::write(&target, text)?;
        projects::remember_project(&self.config, &path)?;
        Ok(target)
    }

    // ============================================================
    // Status & transfer
    // ============================================================

    pub fn status(&self) -> Result<MemoryStatus> {
        let sessions = index::list_sessions(&self.config)?;
        let mut note_entries = 0;
        for s in &sessions {
            note_entries += journal::entries(&self.config.journal_path(&s.id))?.len();
        }
        Ok(MemoryStatus {
            root: self.config.root.display().to_string(),
            session_count: sessions.len(),
            note_entries,
            known_projects: projects::known_projects(&self.config)?.len(),
            latest_session: sessions.first().map(|s| LatestSession {
                id: s.id.clone(),
                title: s.title.clone(),
                date: s.modified.format("%Y-%m-%d").to_string(),
            }),
        })
    }

    pub fn export_memory(
        &self,
        include_credentials: bool,
        passphrase: Option<&str>,
    ) -> Result<String> {
        transfer::export(&self.config, &self.vault, include_credentials, passphrase)
    }

    pub fn import_memory(
        &self,
        container: &str,
        passphrase: Option<&str>,
    ) -> Result<ImportSummary> {
        transfer::import(&self.config, &self.locks, &self.vault, container, passphrase)
    }
}
