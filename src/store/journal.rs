//! Append-only per-session note journal with tagged search.
//!
//! On-disk format, one file per session:
//!
//! ```text
//! # Session Notes
//!
//! ## 2026-08-23T14:05 #deploy
//! body text
//! ---
//! ```
//!
//! Each entry is a `##` header line carrying a minute-precision timestamp
//! and an optional `#tag` marker, the body, and a closing `---` delimiter
//! line. Entries are never rewritten; every mutation is an append preceded
//! by a backup snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::MemoryConfig;
use crate::error::Result;
use crate::locks::PathLocks;
use crate::models::{NoteEntry, NoteMatch, SessionSummary};

use super::backup;

const DOC_HEADER: &str = "# Session Notes";
const DELIMITER: &str = "---";
const ENTRY_MARKER: &str = "## ";

/// Timestamp format for entry headers, minute precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Append a new note to a session's journal. Returns the journal path.
pub fn append(
    config: &MemoryConfig,
    locks: &PathLocks,
    session_id: &str,
    body: &str,
    tag: Option<&str>,
) -> Result<PathBuf> {
    let entry = NoteEntry {
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        tag: tag.map(str::to_string),
        body: body.trim().to_string(),
    };
    append_entry(config, locks, session_id, &entry)
}

/// Append a pre-built entry, preserving its timestamp. Used by import.
pub fn append_entry(
    config: &MemoryConfig,
    locks: &PathLocks,
    session_id: &str,
    entry: &NoteEntry,
) -> Result<PathBuf> {
    let path = config.journal_path(session_id);
    let lock = locks.lock_for(&path);
    let _guard = lock.lock().expect("journal lock poisoned");

    backup::snapshot_journal(config, session_id)?;
    fs::create_dir_all(config.session_dir(session_id))?;

    let block = render_entry(entry);
    if path.exists() {
        let mut content = fs::read_to_string(&path)?;
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&block);
        fs::write(&path, content)?;
    } else {
        fs::write(&path, format!("{}\n{}", DOC_HEADER, block))?;
    }

    Ok(path)
}

fn render_entry(entry: &NoteEntry) -> String {
    let header = match &entry.tag {
        Some(tag) => format!("{}{} #{}", ENTRY_MARKER, entry.timestamp, tag),
        None => format!("{}{}", ENTRY_MARKER, entry.timestamp),
    };
    format!("\n{}\n{}\n{}\n", header, entry.body, DELIMITER)
}

/// Parse a journal file into entries, in append order. The leading document
/// header fragment is discarded; a missing file is an empty journal.
pub fn entries(path: &Path) -> Result<Vec<NoteEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    Ok(parse(&fs::read_to_string(path)?))
}

fn parse(content: &str) -> Vec<NoteEntry> {
    let mut out = Vec::new();
    for fragment in content.split(&format!("\n{}\n", DELIMITER)) {
        if let Some(entry) = parse_fragment(fragment) {
            out.push(entry);
        }
    }
    out
}

/// One fragment between delimiters. Text before the entry header (the
/// document header, or nothing) is discarded.
fn parse_fragment(fragment: &str) -> Option<NoteEntry> {
    let mut lines = fragment.lines();
    let header = lines.find(|l| l.starts_with(ENTRY_MARKER))?;
    let rest = header.trim_start_matches(ENTRY_MARKER).trim();

    let (timestamp, tag) = match rest.split_once(" #") {
        Some((ts, tag)) => (ts.trim().to_string(), Some(tag.trim().to_string())),
        None => (rest.to_string(), None),
    };

    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    if timestamp.is_empty() && body.is_empty() {
        return None;
    }
    Some(NoteEntry { timestamp, tag, body })
}

/// Search journals across the most recent `window` sessions.
///
/// Filters are conjunctive: an entry matches when the query (if any) occurs
/// case-insensitively in the body AND the literal `#tag` marker (if any)
/// occurs in the entry. Results come back in session-recency order, append
/// order within a session.
pub fn search(
    config: &MemoryConfig,
    sessions: &[SessionSummary],
    query: Option<&str>,
    tag: Option<&str>,
    window: usize,
) -> Result<Vec<NoteMatch>> {
    let query_lower = query.map(str::to_lowercase);
    let tag_marker = tag.map(|t| format!("#{}", t));

    let mut matches = Vec::new();
    for session in sessions.iter().take(window) {
        let path = config.journal_path(&session.id);
        for entry in entries(&path)? {
            let query_ok = query_lower
                .as_deref()
                .map(|q| entry.body.to_lowercase().contains(q))
                .unwrap_or(true);
            let tag_ok = tag_marker
                .as_deref()
                .map(|marker| {
                    entry.tag.as_deref().map(|t| format!("#{}", t)).as_deref() == Some(marker)
                        || entry.body.contains(marker)
                })
                .unwrap_or(true);
            if query_ok && tag_ok {
                matches.push(NoteMatch {
                    session_id: session.id.clone(),
                    session_title: session.title.clone(),
                    session_date: session.modified.format("%Y-%m-%d").to_string(),
                    entry,
                });
            }
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_append_creates_document_header() {
        let tmp = tempfile::tempdir().unwrap();
        let config = MemoryConfig::new(tmp.path());
        let locks = PathLocks::new();

        let path = append(&config, &locks, "s1", "first note", None).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Session Notes\n"));
        assert!(content.contains("first note"));
        assert!(content.trim_end().ends_with("---"));
    }

    #[test]
    fn entries_come_back_in_append_order() {
        let tmp = tempfile::tempdir().unwrap();
        let config = MemoryConfig::new(tmp.path());
        let locks = PathLocks::new();

        append(&config, &locks, "s1", "one", None).unwrap();
        append(&config, &locks, "s1", "two", Some("deploy")).unwrap();
        append(&config, &locks, "s1", "three", None).unwrap();

        let parsed = entries(&config.journal_path("s1")).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].body, "one");
        assert_eq!(parsed[1].tag.as_deref(), Some("deploy"));
        assert_eq!(parsed[2].body, "three");
    }

    #[test]
    fn multiline_bodies_survive_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let config = MemoryConfig::new(tmp.path());
        let locks = PathLocks::new();

        append(&config, &locks, "s1", "line one\nline two", None).unwrap();
        let parsed = entries(&config.journal_path("s1")).unwrap();
        assert_eq!(parsed[0].body, "line one\nline two");
    }

    #[test]
    fn append_takes_a_backup_once_the_journal_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let config = MemoryConfig::new(tmp.path());
        let locks = PathLocks::new();

        append(&config, &locks, "s1", "one", None).unwrap();
        assert!(!config.backups_dir("s1").exists());

        append(&config, &locks, "s1", "two", None).unwrap();
        let backups: Vec<_> = fs::read_dir(config.backups_dir("s1"))
            .unwrap()
            .collect();
        assert_eq!(backups.len(), 1);
    }
}
