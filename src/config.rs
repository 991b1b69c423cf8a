use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::storage::NOTES_KEY;
use crate::theme::ThemeKind;

/// Data directory name, looked up from the current directory upwards.
pub const DATA_DIR: &str = ".postit";
/// Environment override for the data directory.
pub const DATA_DIR_ENV: &str = "POSTIT_DATA_DIR";
const CONFIG_FILE: &str = "config.json";

/// Runtime configuration, read from `<data dir>/config.json` when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostitConfig {
    /// Key under which the note list is persisted.
    pub storage_key: String,
    /// Theme reported to surfaces on `ready`.
    pub theme: ThemeKind,
}

impl Default for PostitConfig {
    fn default() -> Self {
        Self {
            storage_key: NOTES_KEY.to_string(),
            theme: ThemeKind::Light,
        }
    }
}

impl PostitConfig {
    /// Load the config from `data_dir`, falling back to defaults when the file is missing.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&path)?;
        let config = serde_json::from_slice(&bytes)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Resolve the data directory: explicit path, then `POSTIT_DATA_DIR`, then the
/// nearest `.postit/` above the current directory, then `./.postit`.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_data_dir(&cwd)
}

/// Nearest existing `.postit/` at or above `start`, else `start/.postit`.
fn find_data_dir(start: &Path) -> PathBuf {
    let mut current = start;
    loop {
        let candidate = current.join(DATA_DIR);
        if candidate.is_dir() {
            return candidate;
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return start.join(DATA_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PostitConfig::default();
        assert_eq!(config.storage_key, "postit.notes");
        assert_eq!(config.theme, ThemeKind::Light);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(PostitConfig::load(tmp.path()).unwrap(), PostitConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.json"), r#"{"theme": 2}"#).unwrap();

        let config = PostitConfig::load(tmp.path()).unwrap();
        assert_eq!(config.theme, ThemeKind::Dark);
        assert_eq!(config.storage_key, NOTES_KEY);
    }

    #[test]
    fn test_explicit_dir_wins() {
        let tmp = TempDir::new().unwrap();
        let dir = resolve_data_dir(Some(tmp.path().to_path_buf()));
        assert_eq!(dir, tmp.path());
    }

    #[test]
    fn test_finds_data_dir_in_ancestor() {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join(DATA_DIR);
        let nested = tmp.path().join("src").join("deep");
        fs::create_dir_all(&data).unwrap();
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_data_dir(&nested), data);
    }

    #[test]
    fn test_defaults_to_start_dir_when_none_found() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("fresh");
        fs::create_dir_all(&nested).unwrap();

        // Only meaningful when no ancestor of the temp dir has a data dir.
        if tmp.path().ancestors().all(|p| !p.join(DATA_DIR).is_dir()) {
            assert_eq!(find_data_dir(&nested), nested.join(DATA_DIR));
        }
    }
}
