//! Request types for MCP tools.

use std::collections::BTreeMap;

use rmcp::schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListRecentSessionsRequest {
    #[schemars(description = "Maximum number of sessions to return (default 10)")]
    #[serde(default)]
    pub count: Option<u32>,
    #[schemars(
        description = "Optional project path or name; only sessions whose text mentions it are returned. Heuristic substring match; expect occasional false positives on short names."
    )]
    #[serde(default)]
    pub project_filter: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecallFullSessionRequest {
    #[schemars(description = "The session ID (directory name) as returned by list_recent_sessions")]
    pub session_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadCredentialsRequest {
    #[schemars(description = "Absolute path of the project directory")]
    pub project_path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteCredentialsRequest {
    #[schemars(description = "Absolute path of the project directory")]
    pub project_path: String,
    #[schemars(
        description = "Credential record: section name to key/value map. Use section 'general' for unsectioned keys."
    )]
    pub record: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteContextFileRequest {
    #[schemars(description = "Absolute path of the project directory")]
    pub project_path: String,
    #[schemars(description = "Context snapshot written verbatim to AGENT_CONTEXT.md")]
    pub text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AppendNoteRequest {
    #[schemars(description = "The note body")]
    pub note: String,
    #[schemars(description = "Optional tag token, searchable later as #tag")]
    #[serde(default)]
    pub tag: Option<String>,
    #[schemars(
        description = "Session to append to. Defaults to the most recent session; a fresh session is created when none exists."
    )]
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchNotesRequest {
    #[schemars(description = "Case-insensitive substring to look for in note bodies")]
    #[serde(default)]
    pub query: Option<String>,
    #[schemars(description = "Only entries carrying this #tag")]
    #[serde(default)]
    pub tag: Option<String>,
    #[schemars(description = "How many recent sessions to scan (default 10)")]
    #[serde(default)]
    pub window: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExportMemoryRequest {
    #[schemars(description = "Include per-project credential records in the container")]
    #[serde(default)]
    pub include_credentials: bool,
    #[schemars(
        description = "Optional passphrase. With one the container is portable across machines; without one it only restores on this machine."
    )]
    #[serde(default)]
    pub passphrase: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImportMemoryRequest {
    #[schemars(description = "An encrypted container produced by export_memory")]
    pub container: String,
    #[schemars(description = "Passphrase the container was exported with, if any")]
    #[serde(default)]
    pub passphrase: Option<String>,
}
