//! Pre-write snapshots of the note journal, with retention pruning.

use std::fs;
use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDateTime};

use crate::config::MemoryConfig;
use crate::error::Result;

/// Snapshots older than this are pruned on every new snapshot.
const RETENTION_DAYS: i64 = 30;

const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S%3f";

/// Copy the session's journal verbatim into `.backups/` with a timestamped
/// name, then prune expired snapshots oldest-first. A missing journal means
/// there is nothing to snapshot yet.
pub fn snapshot_journal(config: &MemoryConfig, session_id: &str) -> Result<Option<PathBuf>> {
    let journal = config.journal_path(session_id);
    if !journal.exists() {
        return Ok(None);
    }

    let dir = config.backups_dir(session_id);
    fs::create_dir_all(&dir)?;

    let name = format!("{}.md", Local::now().format(STAMP_FORMAT));
    let target = dir.join(name);
    fs::copy(&journal, &target)?;

    prune(config, session_id)?;
    Ok(Some(target))
}

/// Delete snapshots older than the retention window, oldest first.
fn prune(config: &MemoryConfig, session_id: &str) -> Result<()> {
    let dir = config.backups_dir(session_id);
    if !dir.exists() {
        return Ok(());
    }
    let cutoff = Local::now().naive_local() - Duration::days(RETENTION_DAYS);

    let mut expired: Vec<(NaiveDateTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        // Names that don't parse as timestamps are left alone.
        let Ok(stamp) = NaiveDateTime::parse_from_str(stem, STAMP_FORMAT) else {
            continue;
        };
        if stamp < cutoff {
            expired.push((stamp, path));
        }
    }

    expired.sort_by(|a, b| a.0.cmp(&b.0));
    for (_, path) in expired {
        fs::remove_file(&path)?;
    }
    Ok(())
}
