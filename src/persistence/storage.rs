//! Record storage backends
//!
//! The adapter only needs keyed get/set/has/delete plus a snapshot for
//! export. Each call is individually serialized; nothing spans calls.

use super::record::Record;
use indexmap::IndexMap;
use std::sync::RwLock;
use tracing::debug;

/// Key/value backend keyed by semantic ID
pub trait RecordStorage: Send + Sync {
    /// Deep copy of the record under `id`
    fn get(&self, id: &str) -> Option<Record>;

    /// Insert or replace the record under `id`
    fn set(&self, id: &str, record: Record);

    fn has(&self, id: &str) -> bool;

    /// Remove the record; true if it existed
    fn delete(&self, id: &str) -> bool;

    /// Copies of every record in insertion order
    fn records(&self) -> Vec<Record>;
}

/// In-memory record storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<IndexMap<String, Record>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStorage for MemoryStorage {
    fn get(&self, id: &str) -> Option<Record> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    fn set(&self, id: &str, record: Record) {
        debug!("Storing record {}", id);
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string(), record);
    }

    fn has(&self, id: &str) -> bool {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }

    fn delete(&self, id: &str) -> bool {
        let removed = self
            .records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .shift_remove(id)
            .is_some();
        if removed {
            debug!("Deleted record {}", id);
        }
        removed
    }

    fn records(&self) -> Vec<Record> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        assert!(!storage.has("test:a"));

        storage.set("test:a", Record::new("test:a"));
        storage.set("test:b", Record::new("test:b"));
        assert!(storage.has("test:a"));
        assert_eq!(storage.len(), 2);

        let mut copy = storage.get("test:a").unwrap();
        copy.add_types(["test:T"]);
        assert_eq!(storage.get("test:a").unwrap().types().len(), 1);

        assert!(storage.delete("test:a"));
        assert!(!storage.delete("test:a"));
        let ids: Vec<_> = storage.records().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec!["test:b"]);
    }
}
