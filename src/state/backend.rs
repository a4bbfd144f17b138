//! Key-value storage backends.
//!
//! A backend is a flat map of string keys to string values. Handles are cheap
//! to clone and every clone addresses the same underlying storage, so a clone
//! behaves like a second execution context looking at the same data.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use walkdir::WalkDir;

use crate::error::{PlannerError, Result};

/// Extension of the per-key files written by [`FileBackend`].
const ENTRY_EXTENSION: &str = "json";

/// Durable string storage addressed by key.
pub trait KvBackend: Clone {
    /// Value stored under `key`, or `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`. Durable when this returns `Ok`.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Map-backed storage, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    /// Maximum total of key + value characters, if any.
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes once `quota` characters are used.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Arc::default(),
            quota: Some(quota),
        }
    }

    fn poisoned() -> PlannerError {
        PlannerError::StorageUnavailable {
            reason: "storage lock poisoned".to_string(),
        }
    }
}

impl KvBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;

        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.chars().count() + v.chars().count())
                .sum();
            let needed = key.chars().count() + value.chars().count();
            if used + needed > quota {
                return Err(PlannerError::StorageUnavailable {
                    reason: format!(
                        "quota exceeded: {} of {} characters in use, {} requested",
                        used, quota, needed
                    ),
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.keys().cloned().collect())
    }
}

// ============================================================================
// File backend
// ============================================================================

/// One `<key>.json` file per key inside a data directory.
///
/// Writes go to a temporary file that is renamed over the entry, so readers in
/// other processes see either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Open (lazily creating) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(PlannerError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(format!("{}.{}", key, ENTRY_EXTENSION)))
    }

    fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|e| PlannerError::DirectoryCreateError {
                path: self.root.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

impl KvBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PlannerError::FileReadError { path, source: e }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        self.ensure_root()?;

        let tmp_path = path.with_extension(format!("{}.tmp", ENTRY_EXTENSION));
        fs::write(&tmp_path, value).map_err(|e| PlannerError::FileWriteError {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| PlannerError::FileWriteError {
            path: path.clone(),
            source: e,
        })?;

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PlannerError::FileWriteError { path, source: e }),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let suffix = format!(".{}", ENTRY_EXTENSION);
        let mut keys: Vec<String> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                name.strip_suffix(&suffix).map(String::from)
            })
            .filter(|key| !key.starts_with('.'))
            .collect();

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_clones_share_entries() {
        let a = MemoryBackend::new();
        let b = a.clone();

        a.set_item("projects", "[]").unwrap();
        assert_eq!(b.get_item("projects").unwrap().as_deref(), Some("[]"));

        b.remove_item("projects").unwrap();
        assert!(a.get_item("projects").unwrap().is_none());
    }

    #[test]
    fn test_memory_quota() {
        let backend = MemoryBackend::with_quota(20);
        backend.set_item("k", "0123456789").unwrap();
        assert!(backend.set_item("other", "0123456789").is_err());
        // Overwriting the same key only counts the new value
        backend.set_item("k", "01234567890123").unwrap();
    }

    #[test]
    fn test_file_backend_persists_across_handles() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("store");

        let first = FileBackend::new(&root);
        first.set_item("photodesign_projects", "[1,2]").unwrap();

        let second = FileBackend::new(&root);
        assert_eq!(
            second.get_item("photodesign_projects").unwrap().as_deref(),
            Some("[1,2]")
        );
        assert_eq!(second.keys().unwrap(), vec!["photodesign_projects"]);
    }

    #[test]
    fn test_file_backend_missing_entries() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("never-created"));

        assert!(backend.get_item("absent").unwrap().is_none());
        assert!(backend.keys().unwrap().is_empty());
        backend.remove_item("absent").unwrap();
    }

    #[test]
    fn test_file_backend_rejects_path_keys() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        assert!(matches!(
            backend.set_item("../escape", "x"),
            Err(PlannerError::InvalidKey { .. })
        ));
        assert!(backend.get_item("").is_err());
    }

    #[test]
    fn test_file_backend_ignores_foreign_files() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        backend.set_item("a", "1").unwrap();

        assert_eq!(backend.keys().unwrap(), vec!["a"]);
    }
}
