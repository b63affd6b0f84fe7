//! MCP server integration tests.
//!
//! The MCP layer is thin glue: these tests pin down the text it renders
//! (session recall headers, hints, truncation) on top of a real store.

use std::fs;

use memento::config::MemoryConfig;
use memento::mcp::McpServer;
use memento::store::MemoryStore;

/// Helper to create a test server over a tempdir-backed store.
fn setup() -> (McpServer, MemoryConfig, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("Failed to create tempdir");
    let config = MemoryConfig::new(tmp.path());
    let server = McpServer::new(MemoryStore::new(config.clone()));
    (server, config, tmp)
}

fn make_session(config: &MemoryConfig, id: &str, task: &str) {
    let dir = config.session_dir(id);
    fs::create_dir_all(&dir).expect("Failed to create session dir");
    fs::write(dir.join("task.md"), task).expect("Failed to write task");
}

mod recall_latest_task {
    use super::*;

    #[tokio::test]
    async fn heads_result_with_date_and_id_and_hints_at_full_recall() {
        let (server, config, _tmp) = setup();
        make_session(&config, "a1", "# Fix login bug\n- [x] done");

        let text = server.test_recall_latest_task().expect("Tool failed");

        let first_line = text.lines().next().unwrap();
        assert!(first_line.starts_with("Latest session:"));
        assert!(first_line.contains("a1"));
        assert!(text.contains("Fix login bug"));
        assert!(text.contains("- [x] done"));
        assert!(text.contains("recall_full_session"));
    }

    #[tokio::test]
    async fn empty_memory_is_informational_not_an_error() {
        let (server, _config, _tmp) = setup();

        let text = server.test_recall_latest_task().expect("Tool failed");

        assert!(text.contains("No recorded sessions"));
    }
}

mod recall_full_session {
    use super::*;

    #[tokio::test]
    async fn renders_each_artifact_under_its_own_heading() {
        let (server, config, _tmp) = setup();
        make_session(&config, "a1", "# Fix login bug");
        fs::write(
            config.session_dir("a1").join("walkthrough.md"),
            "opened auth.rs, patched the token check",
        )
        .unwrap();

        let text = server.test_recall_full_session("a1").expect("Tool failed");

        assert!(text.starts_with("Session a1 - Fix login bug"));
        assert!(text.contains("=== task ==="));
        assert!(text.contains("=== walkthrough ==="));
        assert!(text.contains("patched the token check"));
        assert!(!text.contains("=== plan ==="));
    }

    #[tokio::test]
    async fn unknown_session_is_informational() {
        let (server, _config, _tmp) = setup();

        let text = server.test_recall_full_session("ghost").expect("Tool failed");

        assert!(text.contains("No session named"));
    }

    #[tokio::test]
    async fn malformed_session_id_is_a_validation_error() {
        let (server, _config, _tmp) = setup();

        assert!(server.test_recall_full_session("../etc").is_err());
    }
}

mod result_truncation {
    use super::*;

    #[tokio::test]
    async fn oversized_results_are_cut_with_a_marker() {
        let long = "x".repeat(50_000);
        let cut = memento::mcp::truncate(long);

        assert!(cut.len() < 50_000);
        assert!(cut.ends_with("[result truncated]"));
    }

    #[tokio::test]
    async fn short_results_pass_through_untouched() {
        let text = "short".to_string();
        assert_eq!(memento::mcp::truncate(text.clone()), text);
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn notes_written_through_the_store_show_up_in_search() {
        let (server, config, _tmp) = setup();
        make_session(&config, "a1", "# Fix login bug");

        let store = server.test_store();
        store
            .append_note("token refresh was the culprit", Some("gotcha"), Some("a1"))
            .unwrap();

        let matches = store
            .search_notes(Some("culprit"), Some("gotcha"), 10)
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].session_id, "a1");
        assert_eq!(matches[0].session_title, "Fix login bug");
    }
}
