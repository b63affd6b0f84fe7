use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-process advisory locks keyed by file path.
///
/// Every journal or vault mutation takes the lock for its target file, so
/// two operations inside one process never interleave writes to the same
/// resource. There is no cross-process locking: concurrent external writers
/// remain last-writer-wins, which is an accepted limitation.
#[derive(Debug, Clone, Default)]
pub struct PathLocks {
    inner: Arc<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock for a path. Callers hold the returned guard's mutex for the
    /// duration of the mutation.
    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().expect("lock table poisoned");
        map.entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
