use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CredentialRecord, NoteEntry};

/// Plaintext form of the encrypted export container.
///
/// Serialized to JSON and encrypted with the same cipher scheme as the
/// vault. With a passphrase the container is portable across machines;
/// without one it inherits the machine-bound key and only restores on the
/// machine that produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportBundle {
    /// Session ID → journal entries, in append order.
    pub sessions: BTreeMap<String, Vec<NoteEntry>>,
    /// Project path → credential record. Empty unless credentials were
    /// requested at export time.
    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialRecord>,
}

/// Outcome of merging a container into the local store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub sessions_touched: usize,
    pub entries_added: usize,
    pub entries_skipped: usize,
    pub credentials_restored: usize,
}
