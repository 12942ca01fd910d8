//! The key-value engine trait consumed by the record stores.

use crate::StoreError;

/// A single staged operation inside a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// An ordered set of writes applied atomically by [`KvEngine::write`].
///
/// Staging is pure bookkeeping; nothing touches the engine until the batch
/// is handed to `write`. A batch that is never written has no effect.
#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(BatchOp::Put { key, value });
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.ops.push(BatchOp::Delete { key });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// An embedded key-value engine: point lookups, atomic batched writes, and
/// ordered prefix iteration.
///
/// Implementations must commit each [`WriteBatch`] as its own discrete
/// all-or-nothing transaction, never coalesced with another caller's
/// in-flight batch. Reads must see either all of a committed batch or none
/// of it.
pub trait KvEngine: Send + Sync {
    /// Look up the value stored under `key`.
    ///
    /// Returns `StoreError::NotFound` when the key is absent.
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StoreError>;

    /// Apply every operation in `batch` atomically.
    fn write(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Call `visit` for every entry whose key starts with `prefix`, in key
    /// order. The first visitor error aborts the iteration and propagates.
    fn iterate(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError>;

    /// Flush pending state and release engine resources.
    fn close(&self) -> Result<(), StoreError>;
}
