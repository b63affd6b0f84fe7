//! Memento: local file-backed memory for AI coding agents.
//!
//! The core is three stores under one root:
//!
//! - **Sessions**: one directory of markdown artifacts per unit of work,
//!   indexed and ranked by recency.
//! - **Note journal**: an append-only, tagged, searchable log per session,
//!   snapshotted before every write.
//! - **Credential vault**: encrypted per-project key/value records with
//!   transparent migration from the legacy plaintext format.
//!
//! The MCP layer in [`mcp`] is thin glue over [`store::MemoryStore`]; all
//! design lives in the core modules.

pub mod config;
pub mod error;
pub mod locks;
pub mod mcp;
pub mod models;
pub mod store;
pub mod vault;
