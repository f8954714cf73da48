//! In-memory store, used by tests and dry runs.

use std::sync::{Mutex, MutexGuard};

use crate::hive::Hive;
use crate::{Store, StoreError, StoreResult, Value};

#[derive(Debug, Default)]
struct State {
    hive: Hive,
    deny_all: bool,
    deny_writes: bool,
    writes: usize,
}

/// A store held entirely in memory.
///
/// Access failures can be simulated with [`MemoryStore::deny_access`] (every
/// operation fails) and [`MemoryStore::deny_writes`] (reads succeed).
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn deny_access(&self, deny: bool) {
        self.state().deny_all = deny;
    }

    pub fn deny_writes(&self, deny: bool) {
        self.state().deny_writes = deny;
    }

    /// Number of successful mutations (writes and deletions) so far.
    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Every entry as `(path, name, value)`, sorted by path then name.
    pub fn entries(&self) -> Vec<(String, String, Value)> {
        self.state().hive.entries()
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.state().hive.contains_path(path)
    }

    fn check_read(state: &State, path: &str) -> StoreResult<()> {
        if state.deny_all {
            return Err(StoreError::AccessDenied {
                path: path.to_string(),
            });
        }
        Ok(())
    }

    fn check_write(state: &State, path: &str) -> StoreResult<()> {
        if state.deny_all || state.deny_writes {
            return Err(StoreError::AccessDenied {
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    fn ensure_path(&self, path: &str) -> StoreResult<()> {
        let mut state = self.state();
        Self::check_write(&state, path)?;
        state.hive.ensure_path(path);
        Ok(())
    }

    fn get_dword(&self, path: &str, name: &str) -> StoreResult<Option<i32>> {
        let state = self.state();
        Self::check_read(&state, path)?;
        state.hive.get_dword(path, name)
    }

    fn get_string(&self, path: &str, name: &str) -> StoreResult<Option<String>> {
        let state = self.state();
        Self::check_read(&state, path)?;
        state.hive.get_string(path, name)
    }

    fn set_dword(&self, path: &str, name: &str, value: i32) -> StoreResult<()> {
        let mut state = self.state();
        Self::check_write(&state, path)?;
        state.hive.set(path, name, Value::Dword(value));
        state.writes += 1;
        Ok(())
    }

    fn set_string(&self, path: &str, name: &str, value: &str) -> StoreResult<()> {
        let mut state = self.state();
        Self::check_write(&state, path)?;
        state.hive.set(path, name, Value::String(value.to_string()));
        state.writes += 1;
        Ok(())
    }

    fn delete_value(&self, path: &str, name: &str) -> StoreResult<()> {
        let mut state = self.state();
        Self::check_write(&state, path)?;
        if state.hive.delete(path, name) {
            state.writes += 1;
        }
        Ok(())
    }
}
