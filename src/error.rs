use thiserror::Error;

/// Errors raised by the memory core.
///
/// The taxonomy matters at the dispatch boundary: validation errors map to
/// invalid-params responses, everything else to internal errors. Not-found
/// conditions are *not* errors anywhere in the core; they come back as
/// empty results.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Bad input caught before touching storage (relative path, malformed
    /// session id, missing argument).
    #[error("invalid argument: {0}")]
    Validation(String),

    /// An encrypted vault or container that cannot be decrypted on this
    /// machine. Distinct from not-found and from generic I/O: the file is
    /// there but was created elsewhere or is corrupted.
    #[error("cannot decrypt {0}: created on another machine or corrupted")]
    VaultUnreadable(String),

    /// Encryption-side failures (key derivation, cipher setup).
    #[error("encryption failed: {0}")]
    Crypto(String),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MemoryError>;
