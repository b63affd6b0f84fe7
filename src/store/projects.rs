//! Registry of project paths the store has touched.
//!
//! Updated whenever a credential or context-file operation names a project.
//! Backs `list_known_projects` and the credential walk during export. Lives
//! in the reserved `_registry` directory so it is never mistaken for a
//! session.

use std::fs;
use std::path::Path;

use crate::config::MemoryConfig;
use crate::error::Result;

const REGISTRY_FILE: &str = "projects.json";

pub fn known_projects(config: &MemoryConfig) -> Result<Vec<String>> {
    let path = config.registry_dir().join(REGISTRY_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let list: Vec<String> = serde_json::from_str(&fs::read_to_string(&path)?)?;
    Ok(list)
}

/// Record a project path, keeping the list sorted and deduplicated.
pub fn remember_project(config: &MemoryConfig, project: &Path) -> Result<()> {
    let mut list = known_projects(config)?;
    let entry = project.display().to_string();
    if list.contains(&entry) {
        return Ok(());
    }
    list.push(entry);
    list.sort();

    fs::create_dir_all(config.registry_dir())?;
    fs::write(
        config.registry_dir().join(REGISTRY_FILE),
        serde_json::to_string_pretty(&list)?,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn empty_registry_is_an_empty_list() {
        let tmp = tempfile::tempdir().unwrap();
        let config = MemoryConfig::new(tmp.path());
        assert!(known_projects(&config).unwrap().is_empty());
    }

    #[test]
    fn remember_is_idempotent_and_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        let config = MemoryConfig::new(tmp.path());

        remember_project(&config, &PathBuf::from("/work/zeta")).unwrap();
        remember_project(&config, &PathBuf::from("/work/alpha")).unwrap();
        remember_project(&config, &PathBuf::from("/work/zeta")).unwrap();

        assert_eq!(
            known_projects(&config).unwrap(),
            vec!["/work/alpha".to_string(), "/work/zeta".to_string()]
        );
    }
}
