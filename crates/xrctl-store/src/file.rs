//! JSON-file-backed store for machines without a registry.
//!
//! The document maps namespace paths to `name -> value` objects. Integers
//! are DWORDs, strings are strings:
//!
//! ```json
//! { "SOFTWARE\\PimaxXR": { "joystick_deadzone": 2 } }
//! ```
//!
//! Every mutation replaces the whole file before returning.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::hive::Hive;
use crate::{Store, StoreError, StoreResult, Value};

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    hive: Mutex<Hive>,
}

impl FileStore {
    /// Opens `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let hive = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Hive::default(),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Hive::default(),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(StoreError::AccessDenied {
                    path: path.display().to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        debug!("opened file store at {}", path.display());
        Ok(Self {
            path,
            hive: Mutex::new(hive),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry as `(path, name, value)`.
    pub fn entries(&self) -> Vec<(String, String, Value)> {
        self.hive().entries()
    }

    fn hive(&self) -> MutexGuard<'_, Hive> {
        match self.hive.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, hive: &Hive) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(hive)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| self.map_io(e))?;
                parent
            }
            None => Path::new("."),
        };
        // Written beside the target and renamed over it, so a crash leaves
        // either the old or the new document.
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| self.map_io(e))?;
        staged
            .write_all(text.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| self.map_io(e))?;
        staged
            .persist(&self.path)
            .map_err(|e| self.map_io(e.error))?;
        Ok(())
    }

    fn map_io(&self, err: io::Error) -> StoreError {
        if err.kind() == io::ErrorKind::PermissionDenied {
            StoreError::AccessDenied {
                path: self.path.display().to_string(),
            }
        } else {
            StoreError::Io(err)
        }
    }

    fn mutate(&self, apply: impl FnOnce(&mut Hive) -> bool) -> StoreResult<()> {
        let mut hive = self.hive();
        let mut next = hive.clone();
        if apply(&mut next) {
            self.persist(&next)?;
            *hive = next;
        }
        Ok(())
    }
}

impl Store for FileStore {
    fn ensure_path(&self, path: &str) -> StoreResult<()> {
        self.mutate(|hive| {
            if hive.contains_path(path) {
                false
            } else {
                hive.ensure_path(path);
                true
            }
        })
    }

    fn get_dword(&self, path: &str, name: &str) -> StoreResult<Option<i32>> {
        self.hive().get_dword(path, name)
    }

    fn get_string(&self, path: &str, name: &str) -> StoreResult<Option<String>> {
        self.hive().get_string(path, name)
    }

    fn set_dword(&self, path: &str, name: &str, value: i32) -> StoreResult<()> {
        self.mutate(|hive| {
            hive.set(path, name, Value::Dword(value));
            true
        })
    }

    fn set_string(&self, path: &str, name: &str, value: &str) -> StoreResult<()> {
        self.mutate(|hive| {
            hive.set(path, name, Value::String(value.to_string()));
            true
        })
    }

    fn delete_value(&self, path: &str, name: &str) -> StoreResult<()> {
        self.mutate(|hive| hive.delete(path, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        assert!(store.entries().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_delete_absent_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.delete_value("SOFTWARE\\PimaxXR", "guardian").unwrap();
        assert!(!path.exists());
    }
}
