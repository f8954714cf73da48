use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{StoreError, StoreResult, Value, ValueKind};

/// In-memory tree of paths and their values shared by the memory and file
/// backends. Lookups ignore ASCII case; the first spelling written is kept.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Hive {
    keys: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Hive {
    fn key_name(&self, path: &str) -> Option<&String> {
        self.keys.keys().find(|k| k.eq_ignore_ascii_case(path))
    }

    fn values(&self, path: &str) -> Option<&BTreeMap<String, Value>> {
        self.key_name(path).and_then(|k| self.keys.get(k))
    }

    fn values_mut(&mut self, path: &str) -> &mut BTreeMap<String, Value> {
        let existing = self.key_name(path).cloned();
        self.keys
            .entry(existing.unwrap_or_else(|| path.to_string()))
            .or_default()
    }

    pub(crate) fn ensure_path(&mut self, path: &str) {
        self.values_mut(path);
    }

    pub(crate) fn contains_path(&self, path: &str) -> bool {
        self.key_name(path).is_some()
    }

    pub(crate) fn get(&self, path: &str, name: &str) -> Option<&Value> {
        self.values(path)?
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub(crate) fn get_dword(&self, path: &str, name: &str) -> StoreResult<Option<i32>> {
        match self.get(path, name) {
            None => Ok(None),
            Some(Value::Dword(v)) => Ok(Some(*v)),
            Some(Value::String(_)) => Err(StoreError::TypeMismatch {
                name: name.to_string(),
                expected: ValueKind::Dword,
            }),
        }
    }

    pub(crate) fn get_string(&self, path: &str, name: &str) -> StoreResult<Option<String>> {
        match self.get(path, name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Dword(_)) => Err(StoreError::TypeMismatch {
                name: name.to_string(),
                expected: ValueKind::String,
            }),
        }
    }

    pub(crate) fn set(&mut self, path: &str, name: &str, value: Value) {
        let values = self.values_mut(path);
        let existing = values
            .keys()
            .find(|n| n.eq_ignore_ascii_case(name))
            .cloned();
        values.insert(existing.unwrap_or_else(|| name.to_string()), value);
    }

    /// Returns whether a value was actually removed.
    pub(crate) fn delete(&mut self, path: &str, name: &str) -> bool {
        let Some(key) = self.key_name(path).cloned() else {
            return false;
        };
        let Some(values) = self.keys.get_mut(&key) else {
            return false;
        };
        let existing = values
            .keys()
            .find(|n| n.eq_ignore_ascii_case(name))
            .cloned();
        match existing {
            Some(n) => values.remove(&n).is_some(),
            None => false,
        }
    }

    pub(crate) fn entries(&self) -> Vec<(String, String, Value)> {
        self.keys
            .iter()
            .flat_map(|(path, values)| {
                values
                    .iter()
                    .map(move |(name, value)| (path.clone(), name.clone(), value.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut hive = Hive::default();
        hive.set("SOFTWARE\\PimaxXR", "Guardian", Value::Dword(1));
        assert_eq!(
            hive.get_dword("software\\pimaxxr", "guardian").unwrap(),
            Some(1)
        );

        hive.set("software\\PIMAXXR", "GUARDIAN", Value::Dword(0));
        let entries = hive.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "SOFTWARE\\PimaxXR");
        assert_eq!(entries[0].1, "Guardian");
        assert_eq!(entries[0].2, Value::Dword(0));
    }

    #[test]
    fn test_type_mismatch() {
        let mut hive = Hive::default();
        hive.set("K", "name", Value::String("x".into()));
        assert!(matches!(
            hive.get_dword("K", "name"),
            Err(StoreError::TypeMismatch { .. })
        ));
        assert_eq!(hive.get_string("K", "name").unwrap(), Some("x".into()));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut hive = Hive::default();
        assert!(!hive.delete("K", "name"));
        hive.set("K", "name", Value::Dword(3));
        assert!(hive.delete("k", "NAME"));
        assert_eq!(hive.get_dword("K", "name").unwrap(), None);
        assert!(hive.contains_path("K"));
    }
}
