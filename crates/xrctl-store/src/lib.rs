//! Persisted key/value store shared with the OpenXR runtime.
//!
//! Entries live under a namespace path (`SOFTWARE\PimaxXR`, ...) and hold
//! either a 32-bit integer or a string. Names and paths are matched
//! case-insensitively, like the Windows registry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod hive;

pub mod file;
pub mod memory;

#[cfg(target_os = "windows")]
pub mod registry;

pub use file::FileStore;
pub use memory::MemoryStore;

#[cfg(target_os = "windows")]
pub use registry::RegistryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("access denied to '{path}'")]
    AccessDenied { path: String },
    #[error("'{path}\\{name}' failed with OS error {code}")]
    Os { path: String, name: String, code: u32 },
    #[error("'{name}' does not hold a {expected} value")]
    TypeMismatch { name: String, expected: ValueKind },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt store: {0}")]
    Corrupt(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Dword,
    String,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Dword => f.write_str("DWORD"),
            ValueKind::String => f.write_str("string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Dword(i32),
    String(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Dword(_) => ValueKind::Dword,
            Value::String(_) => ValueKind::String,
        }
    }
}

/// A durable, process-wide key/value namespace.
///
/// Every call is blocking and completes before returning. Deleting an
/// absent value succeeds.
pub trait Store: Send + Sync {
    /// Creates the namespace path if it does not exist yet.
    fn ensure_path(&self, path: &str) -> StoreResult<()>;
    fn get_dword(&self, path: &str, name: &str) -> StoreResult<Option<i32>>;
    fn get_string(&self, path: &str, name: &str) -> StoreResult<Option<String>>;
    fn set_dword(&self, path: &str, name: &str, value: i32) -> StoreResult<()>;
    fn set_string(&self, path: &str, name: &str, value: &str) -> StoreResult<()>;
    fn delete_value(&self, path: &str, name: &str) -> StoreResult<()>;
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn ensure_path(&self, path: &str) -> StoreResult<()> {
        (**self).ensure_path(path)
    }

    fn get_dword(&self, path: &str, name: &str) -> StoreResult<Option<i32>> {
        (**self).get_dword(path, name)
    }

    fn get_string(&self, path: &str, name: &str) -> StoreResult<Option<String>> {
        (**self).get_string(path, name)
    }

    fn set_dword(&self, path: &str, name: &str, value: i32) -> StoreResult<()> {
        (**self).set_dword(path, name, value)
    }

    fn set_string(&self, path: &str, name: &str, value: &str) -> StoreResult<()> {
        (**self).set_string(path, name, value)
    }

    fn delete_value(&self, path: &str, name: &str) -> StoreResult<()> {
        (**self).delete_value(path, name)
    }
}

/// Opens the machine-wide store of this platform.
pub fn open_system_store() -> StoreResult<Arc<dyn Store>> {
    #[cfg(target_os = "windows")]
    return Ok(Arc::new(RegistryStore::local_machine()));

    #[cfg(not(target_os = "windows"))]
    Err(StoreError::Unavailable(
        "the registry only exists on Windows; pass --store-file to use a file-backed store"
            .to_string(),
    ))
}
