use std::collections::BTreeMap;

/// Per-project credential data: section name → key → value.
///
/// Keys outside any explicit section land in [`DEFAULT_SECTION`]. The record
/// exists at rest in exactly one of two forms, legacy plaintext
/// `.credentials` or encrypted `.credentials.enc`, and the encrypted form
/// always wins on read.
pub type CredentialRecord = BTreeMap<String, BTreeMap<String, String>>;

/// Section used for keys that appear before any section header.
pub const DEFAULT_SECTION: &str = "general";

/// Legacy plaintext vault file name.
pub const VAULT_PLAIN_FILE: &str = ".credentials";

/// Encrypted vault file name.
pub const VAULT_ENC_FILE: &str = ".credentials.enc";

/// Free-form project snapshot written verbatim by `write_context_file`.
pub const CONTEXT_FILE: &str = "AGENT_CONTEXT.md";
