//! Domain models for Memento.
//!
//! # Core Concepts
//!
//! - [`SessionSummary`]: one unit of recorded agent work, backed by a
//!   directory of markdown artifacts. A session is listed only when at least
//!   one of task/walkthrough/plan has content.
//! - [`ArtifactKind`]: the four tracked markdown documents per session.
//! - [`NoteEntry`]: an append-only journal entry, never mutated or deleted.
//! - [`CredentialRecord`]: per-project section/key/value credential data,
//!   stored encrypted at rest.
//! - [`ExportBundle`]: the plaintext form of the encrypted export container.

mod credentials;
mod export;
mod note;
mod session;
mod status;

pub use credentials::*;
pub use export::*;
pub use note::*;
pub use session::*;
pub use status::*;
