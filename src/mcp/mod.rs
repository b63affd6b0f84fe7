//! MCP server exposing the memory store to coding agents.
//!
//! The transport is thin glue: every tool validates its arguments, calls
//! one store operation, and renders a text or JSON result. No error
//! escapes past this boundary; everything becomes a tool error response.

mod types;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};

use crate::error::MemoryError;
use crate::models::*;
use crate::store::MemoryStore;
use crate::vault::VaultReadOutcome;

/// Ceiling for text results; anything longer is cut and marked.
const MAX_RESULT_CHARS: usize = 40_000;
const TRUNCATION_MARKER: &str = "\n\n[result truncated]";

const DEFAULT_SESSION_COUNT: usize = 10;
const DEFAULT_SEARCH_WINDOW: usize = 10;

#[derive(Clone)]
pub struct McpServer {
    store: MemoryStore,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            tool_router: Self::tool_router(),
        }
    }

    fn map_err(e: MemoryError) -> McpError {
        match e {
            MemoryError::Validation(_) => McpError::invalid_params(e.to_string(), None),
            _ => McpError::internal_error(e.to_string(), None),
        }
    }

    fn text_result(text: String) -> CallToolResult {
        CallToolResult::success(vec![Content::text(truncate(text))])
    }

    fn json_result<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(Self::text_result(json))
    }

    // ============================================================
    // Test helpers - expose tool logic for testing
    // ============================================================

    pub fn test_recall_latest_task(&self) -> Result<String, McpError> {
        self.latest_task_text()
    }

    pub fn test_recall_full_session(&self, session_id: &str) -> Result<String, McpError> {
        self.full_session_text(session_id)
    }

    pub fn test_store(&self) -> &MemoryStore {
        &self.store
    }

    // ============================================================
    // Rendering
    // ============================================================

    fn latest_task_text(&self) -> Result<String, McpError> {
        let latest = self.store.recall_latest_task().map_err(Self::map_err)?;
        let Some(latest) = latest else {
            return Ok("No recorded sessions yet. Memory is empty.".to_string());
        };
        Ok(format!(
            "Latest session: {} ({})\n\n{}\n\nFor the walkthrough, plan, and notes, call recall_full_session with session_id \"{}\".",
            latest.session.modified.format("%Y-%m-%d"),
            latest.session.id,
            latest.content.trim_end(),
            latest.session.id,
        ))
    }

    fn full_session_text(&self, session_id: &str) -> Result<String, McpError> {
        let full = self
            .store
            .recall_full_session(session_id)
            .map_err(Self::map_err)?;
        let Some(full) = full else {
            return Ok(format!("No session named \"{}\".", session_id));
        };

        let mut text = format!(
            "Session {} - {} ({})\n",
            full.session.id,
            full.session.title,
            full.session.modified.format("%Y-%m-%d"),
        );
        if full.artifacts.is_empty() {
            text.push_str("\nThis session has no recorded artifacts.");
        }
        for kind in ArtifactKind::ALL {
            if let Some(content) = full.artifacts.get(&kind) {
                text.push_str(&format!(
                    "\n=== {} ===\n{}\n",
                    kind.as_str(),
                    content.trim_end()
                ));
            }
        }
        Ok(text)
    }
}

#[tool_router]
impl McpServer {
    // ============================================================
    // Session recall
    // ============================================================

    #[tool(
        description = "Recall the task from the most recent work session. Call this when resuming work to see what was last in progress. Returns the session ID, date, and the full task (or plan) content, plus a hint for fetching the complete session."
    )]
    async fn recall_latest_task(&self) -> Result<CallToolResult, McpError> {
        Ok(Self::text_result(self.latest_task_text()?))
    }

    #[tool(
        description = "List recent work sessions, newest first. Optionally scope to a project with project_filter (path or name, heuristic substring match). Returns session IDs, titles, and dates."
    )]
    async fn list_recent_sessions(
        &self,
        params: Parameters<ListRecentSessionsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let count = req.count.map(|c| c as usize).unwrap_or(DEFAULT_SESSION_COUNT);
        let sessions = self
            .store
            .list_recent_sessions(count, req.project_filter.as_deref())
            .map_err(Self::map_err)?;
        if sessions.is_empty() {
            return Ok(Self::text_result("No matching sessions.".to_string()));
        }
        Self::json_result(&sessions)
    }

    #[tool(
        description = "Recall everything recorded for one session: task, walkthrough, implementation plan, and session notes. Use the session_id from list_recent_sessions or recall_latest_task."
    )]
    async fn recall_full_session(
        &self,
        params: Parameters<RecallFullSessionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        Ok(Self::text_result(self.full_session_text(&req.session_id)?))
    }

    // ============================================================
    // Notes
    // ============================================================

    #[tool(
        description = "Append a note to a session's journal. Notes are append-only and searchable across sessions; use a tag to make them filterable (e.g. tag 'decision' or 'gotcha'). Without session_id the note goes to the most recent session."
    )]
    async fn append_note(
        &self,
        params: Parameters<AppendNoteRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let (session_id, path) = self
            .store
            .append_note(&req.note, req.tag.as_deref(), req.session_id.as_deref())
            .map_err(Self::map_err)?;
        Ok(Self::text_result(format!(
            "Note appended to session \"{}\" ({})",
            session_id,
            path.display()
        )))
    }

    #[tool(
        description = "Search note journals across recent sessions. Filters are conjunctive: query is a case-insensitive substring match on note bodies, tag matches entries carrying #tag. With no filters, returns every note in the scanned window."
    )]
    async fn search_notes(
        &self,
        params: Parameters<SearchNotesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let window = req.window.map(|w| w as usize).unwrap_or(DEFAULT_SEARCH_WINDOW);
        let matches = self
            .store
            .search_notes(req.query.as_deref(), req.tag.as_deref(), window)
            .map_err(Self::map_err)?;
        if matches.is_empty() {
            return Ok(Self::text_result("No matching notes.".to_string()));
        }
        Self::json_result(&matches)
    }

    // ============================================================
    // Projects & credentials
    // ============================================================

    #[tool(
        description = "List project directories this store has credentials or context for."
    )]
    async fn list_known_projects(&self) -> Result<CallToolResult, McpError> {
        let projects = self.store.list_known_projects().map_err(Self::map_err)?;
        if projects.is_empty() {
            return Ok(Self::text_result("No known projects.".to_string()));
        }
        Self::json_result(&projects)
    }

    #[tool(
        description = "Read a project's credential record. Credentials are stored encrypted per project; a legacy plaintext file is migrated to the encrypted form on first read. Returns sections of key/value pairs."
    )]
    async fn read_credentials(
        &self,
        params: Parameters<ReadCredentialsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let outcome = self
            .store
            .read_credentials(&req.project_path)
            .map_err(Self::map_err)?;
        match outcome {
            VaultReadOutcome::Missing => Ok(Self::text_result(format!(
                "No credentials stored for {}.",
                req.project_path
            ))),
            VaultReadOutcome::Encrypted(record) | VaultReadOutcome::Migrated(record) => {
                Self::json_result(&record)
            }
        }
    }

    #[tool(
        description = "Write a project's credential record, replacing what is stored. The record is encrypted with a machine-bound key before it touches disk, and the credential file names are added to the project's .gitignore when that file exists."
    )]
    async fn write_credentials(
        &self,
        params: Parameters<WriteCredentialsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let warning = self
            .store
            .write_credentials(&req.project_path, &req.record)
            .map_err(Self::map_err)?;
        let mut text = format!("Credentials written for {}.", req.project_path);
        if let Some(warning) = warning {
            text.push_str(&format!("\nWarning: {}", warning));
        }
        Ok(Self::text_result(text))
    }

    #[tool(
        description = "Write a free-form context snapshot to the project's AGENT_CONTEXT.md, verbatim. Use this to leave orientation notes for the next agent working in that project."
    )]
    async fn write_context_file(
        &self,
        params: Parameters<WriteContextFileRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let path = self
            .store
            .write_context_file(&req.project_path, &req.text)
            .map_err(Self::map_err)?;
        Ok(Self::text_result(format!(
            "Context written to {}.",
            path.display()
        )))
    }

    // ============================================================
    // Status & transfer
    // ============================================================

    #[tool(description = "Report what the memory store currently holds: root path, session count, note count, known projects, and the latest session.")]
    async fn get_status(&self) -> Result<CallToolResult, McpError> {
        let status = self.store.status().map_err(Self::map_err)?;
        Self::json_result(&status)
    }

    #[tool(
        description = "Export all note journals (and optionally credentials) as one encrypted container string. With a passphrase the container can be imported on another machine; without one it is bound to this machine."
    )]
    async fn export_memory(
        &self,
        params: Parameters<ExportMemoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let container = self
            .store
            .export_memory(req.include_credentials, req.passphrase.as_deref())
            .map_err(Self::map_err)?;
        Ok(CallToolResult::success(vec![Content::text(container)]))
    }

    #[tool(
        description = "Import a container produced by export_memory. Merging is additive: entries already present (same timestamp and body) are skipped, nothing is deleted or overwritten, and importing the same container twice is a no-op."
    )]
    async fn import_memory(
        &self,
        params: Parameters<ImportMemoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let summary = self
            .store
            .import_memory(&req.container, req.passphrase.as_deref())
            .map_err(Self::map_err)?;
        Self::json_result(&summary)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "memento".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"Memento is the agent's local memory: past sessions, a searchable note journal, and per-project credentials.

RESUMING WORK:
1. Call recall_latest_task to see what was last in progress
2. Call recall_full_session for the walkthrough, plan, and notes
3. Call list_recent_sessions with project_filter to scope to the current project

RECORDING WORK:
- append_note whenever you learn something worth keeping: decisions, gotchas, environment quirks
- Tag notes ('decision', 'gotcha', 'todo') so search_notes can filter them later
- write_context_file to leave an orientation snapshot in the project itself

CREDENTIALS:
- read_credentials / write_credentials manage an encrypted per-project store
- Records are sections of key=value pairs; use section 'general' by default
- Files are encrypted with a machine-bound key; they cannot be read on another machine

TRANSFER:
- export_memory bundles all journals (and optionally credentials) into one encrypted container
- Pass a passphrase to make the container portable to another machine
- import_memory merges additively and never overwrites existing notes"#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

/// Cap a text result at the character ceiling, marking the cut.
pub fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_RESULT_CHARS {
        return text;
    }
    let mut cut: String = text.chars().take(MAX_RESULT_CHARS).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

/// Serve the store over stdio. Blocks until the client disconnects.
pub async fn run_stdio_server(store: MemoryStore) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(store);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
