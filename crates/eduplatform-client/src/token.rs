//! File-backed token persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use eduplatform_core::traits::TokenStore;

#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Keeps the bearer token in a small JSON file (`{"token": "..."}`) so it
/// survives across runs. Clearing deletes the file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<StoredSession>(&content) {
            Ok(stored) if !stored.token.is_empty() => Some(stored.token),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring unreadable session file: {e}");
                None
            }
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string(&StoredSession {
            token: token.to_string(),
        })?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write session: {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("failed to remove session: {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("session.json"));
        assert!(store.load().is_none());

        store.save("abc123").unwrap();
        assert_eq!(store.load().as_deref(), Some("abc123"));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["token"], "abc123");

        store.clear().unwrap();
        assert!(store.load().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn clearing_missing_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));
        store.clear().unwrap();
    }

    #[test]
    fn garbage_file_reads_as_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(FileTokenStore::new(path).load().is_none());
    }

    #[test]
    fn token_survives_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileTokenStore::new(&path).save("persisted").unwrap();
        assert_eq!(
            FileTokenStore::new(&path).load().as_deref(),
            Some("persisted")
        );
    }
}
