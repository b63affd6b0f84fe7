//! Encrypted per-project credential vault.
//!
//! On disk a project has at most one of two files: the legacy plaintext
//! `.credentials` (section-commented `key=value` text) or the encrypted
//! `.credentials.enc` (`nonce:tag:ciphertext` in hex). The encrypted form
//! always takes precedence on read; a legacy file is migrated to the
//! encrypted form opportunistically, without ever failing the read.

pub mod crypto;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MemoryError, Result};
use crate::locks::PathLocks;
use crate::models::{CredentialRecord, DEFAULT_SECTION, VAULT_ENC_FILE, VAULT_PLAIN_FILE};

/// Advisory header written at the top of every serialized vault.
const VAULT_HEADER: &str = "Credentials managed by memento. Do not edit by hand.";

/// What a vault read found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultReadOutcome {
    /// No vault file in either form. Not an error.
    Missing,
    /// Read from the encrypted file.
    Encrypted(CredentialRecord),
    /// Read from the legacy plaintext file (migration may or may not have
    /// succeeded; the record is valid either way).
    Migrated(CredentialRecord),
}

#[derive(Debug, Clone)]
pub struct CredentialVault {
    locks: PathLocks,
}

impl CredentialVault {
    pub fn new(locks: PathLocks) -> Self {
        Self { locks }
    }

    /// Read a project's credentials, preferring the encrypted form.
    ///
    /// A decryption failure on the encrypted file is a hard
    /// [`MemoryError::VaultUnreadable`]: the file exists but cannot be read
    /// on this machine. A missing file is [`VaultReadOutcome::Missing`].
    pub fn read(&self, project: &Path) -> Result<VaultReadOutcome> {
        let enc_path = project.join(VAULT_ENC_FILE);
        if enc_path.exists() {
            let payload = fs::read_to_string(&enc_path)?;
            let plaintext = crypto::decrypt(&payload).map_err(|e| match e {
                MemoryError::VaultUnreadable(_) => {
                    MemoryError::VaultUnreadable(enc_path.display().to_string())
                }
                other => other,
            })?;
            return Ok(VaultReadOutcome::Encrypted(parse(&plaintext)));
        }

        let plain_path = project.join(VAULT_PLAIN_FILE);
        if !plain_path.exists() {
            return Ok(VaultReadOutcome::Missing);
        }

        let text = fs::read_to_string(&plain_path)?;
        let record = parse(&text);

        // Opportunistic migration. Whatever happens here, the parsed record
        // is still returned to the caller.
        if let Err(e) = self.migrate(project, &text, &plain_path, &enc_path) {
            tracing::warn!("credential migration failed for {}: {}", project.display(), e);
        }

        Ok(VaultReadOutcome::Migrated(record))
    }

    fn migrate(&self, project: &Path, text: &str, plain: &Path, enc: &Path) -> Result<()> {
        let lock = self.locks.lock_for(enc);
        let _guard = lock.lock().expect("vault lock poisoned");

        fs::write(enc, crypto::encrypt(text)?)?;
        fs::remove_file(plain)?;
        ensure_gitignored(project, &[VAULT_ENC_FILE])?;
        tracing::info!("migrated plaintext credentials for {}", project.display());
        Ok(())
    }

    /// Serialize, encrypt, and write a record. Returns a warning string when
    /// the companion `.gitignore` update failed; the vault write itself is
    /// not rolled back in that case.
    pub fn write(&self, project: &Path, record: &CredentialRecord) -> Result<Option<String>> {
        let enc_path = project.join(VAULT_ENC_FILE);
        let lock = self.locks.lock_for(&enc_path);
        let _guard = lock.lock().expect("vault lock poisoned");

        fs::write(&enc_path, crypto::encrypt(&serialize(record))?)?;

        let warning = match ensure_gitignored(project, &[VAULT_PLAIN_FILE, VAULT_ENC_FILE]) {
            Ok(()) => None,
            Err(e) => Some(format!(
                "credentials written, but .gitignore update failed: {}",
                e
            )),
        };
        Ok(warning)
    }

    /// Path of the encrypted vault file for a project.
    pub fn enc_path(project: &Path) -> PathBuf {
        project.join(VAULT_ENC_FILE)
    }
}

/// Parse the section-commented `key=value` text form.
///
/// A `#`-prefixed line names the active section; `key=value` lines assign
/// into it. Sections materialize only when they receive a key, so the
/// advisory header comment never shows up as an empty section.
pub fn parse(text: &str) -> CredentialRecord {
    let mut record = CredentialRecord::new();
    let mut section = DEFAULT_SECTION.to_string();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = line.strip_prefix('#') {
            section = name.trim().to_string();
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            record
                .entry(section.clone())
                .or_insert_with(BTreeMap::new)
                .insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    record
}

/// Serialize a record back to the text form, advisory header first.
pub fn serialize(record: &CredentialRecord) -> String {
    let mut out = format!("# {}\n", VAULT_HEADER);
    for (section, entries) in record {
        out.push_str(&format!("\n# {}\n", section));
        for (key, value) in entries {
            out.push_str(&format!("{}={}\n", key, value));
        }
    }
    out
}

/// Append the given file names to the project's `.gitignore`, but only if
/// that file already exists. The vault never creates it.
fn ensure_gitignored(project: &Path, names: &[&str]) -> Result<()> {
    let path = project.join(".gitignore");
    if !path.exists() {
        return Ok(());
    }
    let mut content = fs::read_to_string(&path)?;
    let existing: Vec<&str> = content.lines().map(str::trim).collect();
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| !existing.contains(n))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for name in missing {
        content.push_str(name);
        content.push('\n');
    }
    fs::write(&path, content)?;
    Ok(())
}
