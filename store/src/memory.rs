//! In-memory engine backing private, non-persistent store instances.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::engine::{BatchOp, KvEngine, WriteBatch};
use crate::StoreError;

/// A thread-safe in-memory [`KvEngine`].
///
/// Used when a store is opened without a path (private instances, tests).
/// The ordered map gives the same key-ordered prefix iteration as the
/// persistent backend. Each batch is applied under a single lock
/// acquisition, so batches are atomic and never interleave.
pub struct MemoryEngine {
    entries: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl KvEngine for MemoryEngine {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{} bytes key", key.len())))
    }

    fn write(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { key, value } => {
                    entries.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn iterate(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let entries = self.entries.lock().unwrap();
        for (key, value) in entries.range(prefix.to_vec()..) {
            if !key.starts_with(prefix) {
                break;
            }
            visit(key, value)?;
        }
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
