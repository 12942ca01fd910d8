//! Typed key-prefix tables.
//!
//! One physical key-value space can multiplex several logical tables; each
//! table owns a fixed prefix and every key it builds or parses goes through
//! this type, keeping key construction disjoint across record kinds.

use crate::StoreError;

/// A logical table inside a shared keyspace, identified by a static prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Table {
    prefix: &'static [u8],
}

impl Table {
    pub const fn new(prefix: &'static [u8]) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> &'static [u8] {
        self.prefix
    }

    /// Build the storage key for a record identified by `suffix`.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.prefix.len() + suffix.len());
        key.extend_from_slice(self.prefix);
        key.extend_from_slice(suffix);
        key
    }

    /// Strip this table's prefix from a full storage key.
    ///
    /// Iteration hands back full keys; a key that does not carry the prefix
    /// means some other record kind leaked into the scan, which is a
    /// programming-contract violation, not data corruption.
    pub fn strip<'k>(&self, key: &'k [u8]) -> Result<&'k [u8], StoreError> {
        key.strip_prefix(self.prefix).ok_or_else(|| {
            StoreError::TypeMismatch(format!(
                "key does not belong to table with prefix {:?}",
                String::from_utf8_lossy(self.prefix)
            ))
        })
    }
}
