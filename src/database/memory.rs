//! In-memory entity store for tests and dry runs

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::KvStore;
use crate::core::IndexerResult;

/// HashMap-backed store with the same column-family discipline as the
/// RocksDB backend. Sorted inner maps keep prefix scans ordered.
#[derive(Default)]
pub struct MemoryStore {
    families: RwLock<HashMap<String, BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get_raw(&self, cf: &str, key: &[u8]) -> IndexerResult<Option<Vec<u8>>> {
        let families = self.families.read().unwrap_or_else(|e| e.into_inner());
        Ok(families.get(cf).and_then(|m| m.get(key)).cloned())
    }

    fn put_raw(&self, cf: &str, key: &[u8], value: &[u8]) -> IndexerResult<()> {
        let mut families = self.families.write().unwrap_or_else(|e| e.into_inner());
        families
            .entry(cf.to_string())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete_raw(&self, cf: &str, key: &[u8]) -> IndexerResult<()> {
        let mut families = self.families.write().unwrap_or_else(|e| e.into_inner());
        if let Some(m) = families.get_mut(cf) {
            m.remove(key);
        }
        Ok(())
    }

    fn prefix_scan(&self, cf: &str, prefix: &[u8]) -> IndexerResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let families = self.families.read().unwrap_or_else(|e| e.into_inner());
        let Some(m) = families.get(cf) else {
            return Ok(Vec::new());
        };
        Ok(m.range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
