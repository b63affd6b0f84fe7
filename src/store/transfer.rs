//! Export and import of the whole memory corpus as one encrypted container.
//!
//! Without a passphrase the container uses the machine-bound key and can
//! only be restored on the machine that produced it. With a passphrase the
//! key is derived from the passphrase instead and the container is portable.
//! The two forms are told apart by their field count on import.

use std::path::Path;

use crate::config::MemoryConfig;
use crate::error::{MemoryError, Result};
use crate::locks::PathLocks;
use crate::models::{ExportBundle, ImportSummary};
use crate::vault::{crypto, CredentialVault, VaultReadOutcome};

use super::{index, journal, projects};

/// Collect every session's journal (and, if requested, every registered
/// project's credentials) into one encrypted container string.
pub fn export(
    config: &MemoryConfig,
    vault: &CredentialVault,
    include_credentials: bool,
    passphrase: Option<&str>,
) -> Result<String> {
    let mut bundle = ExportBundle::default();

    for session in index::list_sessions(config)? {
        let entries = journal::entries(&config.journal_path(&session.id))?;
        if !entries.is_empty() {
            bundle.sessions.insert(session.id, entries);
        }
    }

    if include_credentials {
        for project in projects::known_projects(config)? {
            match vault.read(Path::new(&project)) {
                Ok(VaultReadOutcome::Encrypted(record))
                | Ok(VaultReadOutcome::Migrated(record)) => {
                    bundle.credentials.insert(project, record);
                }
                Ok(VaultReadOutcome::Missing) => {}
                Err(e) => {
                    tracing::warn!("skipping credentials for {}: {}", project, e);
                }
            }
        }
    }

    let json = serde_json::to_string(&bundle)?;
    match passphrase {
        Some(p) => crypto::encrypt_with_passphrase(&json, p),
        None => crypto::encrypt(&json),
    }
}

/// Decrypt a container and merge it into the local store additively.
///
/// An incoming entry is skipped when an entry with identical timestamp and
/// body already exists in that session's journal. Nothing is ever deleted
/// or overwritten, so importing the same container twice is a no-op the
/// second time.
pub fn import(
    config: &MemoryConfig,
    locks: &PathLocks,
    vault: &CredentialVault,
    container: &str,
    passphrase: Option<&str>,
) -> Result<ImportSummary> {
    let json = match (passphrase, crypto::field_count(container)) {
        (Some(p), 4) => crypto::decrypt_with_passphrase(container, p)?,
        (None, 4) => {
            return Err(MemoryError::Validation(
                "container is passphrase-protected; a passphrase is required".to_string(),
            ))
        }
        (_, 3) => crypto::decrypt(container)?,
        _ => return Err(MemoryError::VaultUnreadable("container".to_string())),
    };
    let bundle: ExportBundle = serde_json::from_str(&json)
        .map_err(|_| MemoryError::VaultUnreadable("container".to_string()))?;

    let mut summary = ImportSummary::default();

    for (session_id, incoming) in &bundle.sessions {
        crate::config::validate_session_id(session_id)?;
        let mut seen: Vec<(String, String)> = journal::entries(&config.journal_path(session_id))?
            .into_iter()
            .map(|e| (e.timestamp, e.body))
            .collect();
        let mut touched = false;
        for entry in incoming {
            let key = (entry.timestamp.clone(), entry.body.clone());
            if seen.contains(&key) {
                summary.entries_skipped += 1;
                continue;
            }
            journal::append_entry(config, locks, session_id, entry)?;
            seen.push(key);
            summary.entries_added += 1;
            touched = true;
        }
        if touched {
            summary.sessions_touched += 1;
        }
    }

    for (project, record) in &bundle.credentials {
        let path = crate::config::validate_project_path(project)?;
        if !path.exists() {
            tracing::warn!("skipping credentials for missing project {}", project);
            continue;
        }
        vault.write(&path, record)?;
        projects::remember_project(config, &path)?;
        summary.credentials_restored += 1;
    }

    Ok(summary)
}
