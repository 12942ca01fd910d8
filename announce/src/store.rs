//! The persistent address-to-version-certificate table.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::Serialize;

use herald_store::{KvEngine, MemoryEngine, StoreError, Table, WriteBatch};
use herald_store_lmdb::LmdbEngine;
use herald_types::{ValidatorAddress, VersionCertificate};

use crate::codec;
use crate::merge::{decide, Decision};

/// On-disk layout version passed to the engine at open time. Bump only
/// together with a codec change and an engine migration.
pub const CERTIFICATE_SCHEMA_VERSION: u32 = 0;

/// The certificate table's key prefix. Other record kinds sharing the same
/// physical keyspace must use a different table.
const CERTIFICATE_TABLE: Table = Table::new(b"address:");

/// Basic information about one table entry, keyed by hex address in
/// [`VersionCertificateStore::info`]. Intended for RPC exposure.
#[derive(Clone, Debug, Serialize)]
pub struct CertificateInfo {
    pub address: String,
    pub version: u64,
}

/// Persistent table of the highest-version certificate seen per validator.
///
/// All mutation goes through atomic engine batches: a reader never observes
/// part of an upsert or prune. There is no in-memory cache; every read
/// decodes the persisted bytes, so the table's state is exactly its durable
/// state.
pub struct VersionCertificateStore {
    engine: Box<dyn KvEngine>,
}

impl VersionCertificateStore {
    /// Open the table at `path`, or a private in-memory instance when no
    /// path is given. The in-memory instance honors the full table contract
    /// and vanishes on drop.
    pub fn open(path: Option<&Path>) -> Result<Self, StoreError> {
        let engine: Box<dyn KvEngine> = match path {
            Some(path) => Box::new(LmdbEngine::open(path, CERTIFICATE_SCHEMA_VERSION)?),
            None => Box::new(MemoryEngine::new()),
        };
        Ok(Self { engine })
    }

    /// Construct the table over an arbitrary engine.
    pub fn with_engine(engine: Box<dyn KvEngine>) -> Self {
        Self { engine }
    }

    /// Flush and release the underlying engine. Consuming `self` makes the
    /// call impossible to repeat and the store unusable afterwards.
    pub fn close(self) -> Result<(), StoreError> {
        self.engine.close()
    }

    /// Insert any new certificates and replace entries whose stored version
    /// is lower than the candidate's. Returns the certificates actually
    /// applied, which are exactly the ones callers should re-gossip.
    ///
    /// Candidates that lose the version comparison are skipped silently.
    /// When several candidates in one call target the same address, they are
    /// resolved against each other before anything is staged, so the result
    /// does not depend on their order in the input. All applied records
    /// commit in a single atomic batch; on failure the table is unchanged.
    pub fn upsert(
        &self,
        candidates: Vec<VersionCertificate>,
    ) -> Result<Vec<VersionCertificate>, StoreError> {
        let mut accepted: Vec<VersionCertificate> = Vec::new();
        let mut staged: HashMap<ValidatorAddress, usize> = HashMap::new();

        for candidate in candidates {
            // Resolve against the winner already staged for this address in
            // this call, if any; otherwise against the stored record.
            if let Some(&slot) = staged.get(&candidate.address) {
                if decide(Some(&accepted[slot]), &candidate).accepts() {
                    tracing::trace!(
                        address = %candidate.address,
                        version = candidate.version,
                        "candidate supersedes earlier candidate in batch"
                    );
                    accepted[slot] = candidate;
                }
                continue;
            }

            let existing = match self.get(&candidate.address) {
                Ok(entry) => Some(entry),
                Err(StoreError::NotFound(_)) => None,
                Err(e) => return Err(e),
            };

            match decide(existing.as_ref(), &candidate) {
                Decision::Insert | Decision::Replace => {
                    tracing::trace!(
                        address = %candidate.address,
                        version = candidate.version,
                        "accepting certificate"
                    );
                    staged.insert(candidate.address, accepted.len());
                    accepted.push(candidate);
                }
                Decision::Skip => {
                    tracing::trace!(
                        address = %candidate.address,
                        version = candidate.version,
                        "skipping certificate whose version is not greater than the stored entry"
                    );
                }
            }
        }

        if accepted.is_empty() {
            return Ok(accepted);
        }

        let mut batch = WriteBatch::new();
        for entry in &accepted {
            let value = codec::encode(entry)?;
            batch.put(CERTIFICATE_TABLE.key(entry.address.as_bytes()), value);
        }
        self.engine.write(batch)?;
        tracing::debug!(accepted = accepted.len(), "committed certificate batch");
        Ok(accepted)
    }

    /// Get the stored certificate for `address`.
    ///
    /// Returns `StoreError::NotFound` if no entry exists.
    pub fn get(&self, address: &ValidatorAddress) -> Result<VersionCertificate, StoreError> {
        let bytes = self
            .engine
            .get(&CERTIFICATE_TABLE.key(address.as_bytes()))
            .map_err(|e| match e {
                StoreError::NotFound(_) => StoreError::NotFound(address.to_string()),
                other => other,
            })?;
        codec::decode(&bytes)
    }

    /// Get the stored version for `address`.
    ///
    /// Returns `StoreError::NotFound` if no entry exists.
    pub fn get_version(&self, address: &ValidatorAddress) -> Result<u64, StoreError> {
        Ok(self.get(address)?.version)
    }

    /// Every certificate in the table, in engine iteration order.
    pub fn get_all(&self) -> Result<Vec<VersionCertificate>, StoreError> {
        let mut entries = Vec::new();
        self.iterate(&mut |_, entry| {
            entries.push(entry);
            Ok(())
        })?;
        Ok(entries)
    }

    /// Remove the entry for `address` unconditionally (no version check).
    pub fn remove(&self, address: &ValidatorAddress) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.delete(CERTIFICATE_TABLE.key(address.as_bytes()));
        self.engine.write(batch)
    }

    /// Delete, in one atomic batch, every entry whose address is not in
    /// `keep`. Entries in `keep` are untouched regardless of version. Called
    /// when the validator set changes and stale identities should no longer
    /// be served to peers.
    pub fn prune(&self, keep: &HashSet<ValidatorAddress>) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        self.iterate(&mut |address, _| {
            if !keep.contains(&address) {
                tracing::trace!(address = %address, "pruning certificate");
                batch.delete(CERTIFICATE_TABLE.key(address.as_bytes()));
            }
            Ok(())
        })?;
        if batch.is_empty() {
            return Ok(());
        }
        self.engine.write(batch)
    }

    /// One [`CertificateInfo`] per stored entry, keyed by the hex address.
    pub fn info(&self) -> Result<HashMap<String, CertificateInfo>, StoreError> {
        let mut info = HashMap::new();
        self.iterate(&mut |address, entry| {
            info.insert(
                address.to_hex(),
                CertificateInfo {
                    address: entry.address.to_hex(),
                    version: entry.version,
                },
            );
            Ok(())
        })?;
        Ok(info)
    }

    /// Call `visit` for every stored certificate, decoding as it goes.
    fn iterate(
        &self,
        visit: &mut dyn FnMut(ValidatorAddress, VersionCertificate) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        self.engine
            .iterate(CERTIFICATE_TABLE.prefix(), &mut |key, value| {
                let suffix = CERTIFICATE_TABLE.strip(key)?;
                let address = ValidatorAddress::from_slice(suffix).ok_or_else(|| {
                    StoreError::TypeMismatch(format!(
                        "certificate key suffix has {} bytes, expected {}",
                        suffix.len(),
                        ValidatorAddress::LEN
                    ))
                })?;
                let entry = codec::decode(value)?;
                visit(address, entry)
            })
    }
}

impl fmt::Display for VersionCertificateStore {
    /// Diagnostic dump of the whole table, one record per line. Not a
    /// parseable format. Iteration errors truncate the dump and are logged.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        let result = self.iterate(&mut |address, entry| {
            lines.push(format!("  {} => {}", address, entry));
            Ok(())
        });
        if let Err(e) = result {
            tracing::warn!(error = %e, "error iterating certificate table for display");
        }
        write!(f, "VersionCertificateStore:")?;
        for line in &lines {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_crypto::{keypair_from_seed, sign_version_certificate};
    use herald_types::Signature;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// A signed certificate for the validator derived from `seed`.
    fn cert(seed: u8, version: u64) -> VersionCertificate {
        sign_version_certificate(&keypair_from_seed(&[seed; 32]), version)
    }

    fn mem_store() -> VersionCertificateStore {
        VersionCertificateStore::open(None).expect("open in-memory store")
    }

    /// Engine wrapper whose batch commits can be made to fail on demand.
    struct FailingEngine {
        inner: MemoryEngine,
        fail_writes: Arc<AtomicBool>,
    }

    impl KvEngine for FailingEngine {
        fn get(&self, key: &[u8]) -> Result<Vec<u8>, StoreError> {
            self.inner.get(key)
        }

        fn write(&self, batch: WriteBatch) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("injected write failure".into()));
            }
            self.inner.write(batch)
        }

        fn iterate(
            &self,
            prefix: &[u8],
            visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<(), StoreError>,
        ) -> Result<(), StoreError> {
            self.inner.iterate(prefix, visit)
        }

        fn close(&self) -> Result<(), StoreError> {
            self.inner.close()
        }
    }

    #[test]
    fn upsert_inserts_new_certificates() {
        let store = mem_store();
        let a = cert(1, 1);
        let b = cert(2, 1);

        let accepted = store.upsert(vec![a.clone(), b.clone()]).unwrap();
        assert_eq!(accepted, vec![a.clone(), b.clone()]);

        let mut all = store.get_all().unwrap();
        all.sort_by_key(|c| c.address);
        let mut expected = vec![a, b];
        expected.sort_by_key(|c| c.address);
        assert_eq!(all, expected);
    }

    #[test]
    fn monotonic_acceptance() {
        let store = mem_store();
        store.upsert(vec![cert(1, 3)]).unwrap();

        let accepted = store.upsert(vec![cert(1, 2)]).unwrap();
        assert!(accepted.is_empty());
        assert_eq!(store.get_version(&cert(1, 3).address).unwrap(), 3);

        let accepted = store.upsert(vec![cert(1, 5)]).unwrap();
        assert_eq!(accepted, vec![cert(1, 5)]);
        assert_eq!(store.get_version(&cert(1, 5).address).unwrap(), 5);
    }

    #[test]
    fn resubmitting_the_same_certificate_is_a_noop() {
        let store = mem_store();
        let a = cert(1, 5);

        assert_eq!(store.upsert(vec![a.clone()]).unwrap(), vec![a.clone()]);
        assert!(store.upsert(vec![a.clone()]).unwrap().is_empty());
        assert_eq!(store.get(&a.address).unwrap(), a);
    }

    #[test]
    fn within_batch_conflicts_resolve_by_version_not_input_order() {
        let store = mem_store();
        let accepted = store.upsert(vec![cert(1, 2), cert(1, 7)]).unwrap();
        assert_eq!(accepted, vec![cert(1, 7)]);
        assert_eq!(store.get_version(&cert(1, 7).address).unwrap(), 7);

        let store = mem_store();
        let accepted = store.upsert(vec![cert(1, 7), cert(1, 2)]).unwrap();
        assert_eq!(accepted, vec![cert(1, 7)]);
        assert_eq!(store.get_version(&cert(1, 7).address).unwrap(), 7);
    }

    #[test]
    fn equal_max_versions_keep_the_first_accepted() {
        // Competing certificates with the same address and version can only
        // come from equivocation; the store just has to stay deterministic.
        let address = ValidatorAddress::new([9u8; 20]);
        let first = VersionCertificate::new(
            address,
            keypair_from_seed(&[1u8; 32]).public,
            4,
            Signature([1u8; 64]),
        );
        let second = VersionCertificate::new(
            address,
            keypair_from_seed(&[2u8; 32]).public,
            4,
            Signature([2u8; 64]),
        );

        let store = mem_store();
        let accepted = store.upsert(vec![first.clone(), second]).unwrap();
        assert_eq!(accepted, vec![first.clone()]);
        assert_eq!(store.get(&address).unwrap(), first);
    }

    #[test]
    fn get_on_absent_address_is_not_found() {
        let store = mem_store();
        let err = store.get(&ValidatorAddress::new([0xAA; 20])).unwrap_err();
        assert!(err.is_not_found());
        let err = store
            .get_version(&ValidatorAddress::new([0xAA; 20]))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn remove_deletes_unconditionally() {
        let store = mem_store();
        let a = cert(1, 9);
        store.upsert(vec![a.clone()]).unwrap();

        store.remove(&a.address).unwrap();
        assert!(store.get(&a.address).unwrap_err().is_not_found());

        // Removing an absent entry is not an error.
        store.remove(&a.address).unwrap();
    }

    #[test]
    fn prune_keeps_only_the_keep_set() {
        let store = mem_store();
        let a = cert(1, 1);
        let b = cert(2, 2);
        let c = cert(3, 3);
        store.upsert(vec![a.clone(), b.clone(), c.clone()]).unwrap();

        let keep: HashSet<_> = [a.address, c.address].into_iter().collect();
        store.prune(&keep).unwrap();

        let mut remaining: Vec<_> = store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|e| e.address)
            .collect();
        remaining.sort();
        let mut expected = vec![a.address, c.address];
        expected.sort();
        assert_eq!(remaining, expected);
        assert!(store.get(&b.address).unwrap_err().is_not_found());
    }

    #[test]
    fn prune_ignores_versions() {
        let store = mem_store();
        let a = cert(1, 1_000_000);
        store.upsert(vec![a.clone()]).unwrap();

        store.prune(&HashSet::new()).unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn failed_batch_commit_changes_nothing() {
        let fail_writes = Arc::new(AtomicBool::new(false));
        let store = VersionCertificateStore::with_engine(Box::new(FailingEngine {
            inner: MemoryEngine::new(),
            fail_writes: Arc::clone(&fail_writes),
        }));

        let a1 = cert(1, 1);
        let b1 = cert(2, 1);
        store.upsert(vec![a1.clone(), b1.clone()]).unwrap();

        fail_writes.store(true, Ordering::SeqCst);
        let err = store.upsert(vec![cert(1, 2), cert(2, 2)]).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));

        fail_writes.store(false, Ordering::SeqCst);
        assert_eq!(store.get_version(&a1.address).unwrap(), 1);
        assert_eq!(store.get_version(&b1.address).unwrap(), 1);
    }

    #[test]
    fn failed_prune_changes_nothing() {
        let fail_writes = Arc::new(AtomicBool::new(false));
        let store = VersionCertificateStore::with_engine(Box::new(FailingEngine {
            inner: MemoryEngine::new(),
            fail_writes: Arc::clone(&fail_writes),
        }));

        let a = cert(1, 1);
        store.upsert(vec![a.clone()]).unwrap();

        fail_writes.store(true, Ordering::SeqCst);
        assert!(store.prune(&HashSet::new()).is_err());

        fail_writes.store(false, Ordering::SeqCst);
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn info_is_keyed_by_hex_address() {
        let store = mem_store();
        let a = cert(1, 4);
        let b = cert(2, 6);
        store.upsert(vec![a.clone(), b.clone()]).unwrap();

        let info = store.info().unwrap();
        assert_eq!(info.len(), 2);
        let entry = &info[&a.address.to_hex()];
        assert_eq!(entry.address, a.address.to_hex());
        assert_eq!(entry.version, 4);
        assert_eq!(info[&b.address.to_hex()].version, 6);
    }

    #[test]
    fn display_lists_every_record() {
        let store = mem_store();
        assert_eq!(store.to_string(), "VersionCertificateStore:");

        let a = cert(1, 4);
        store.upsert(vec![a.clone()]).unwrap();
        let dump = store.to_string();
        assert!(dump.contains(&a.address.to_string()));
        assert!(dump.contains("version: 4"));
    }

    #[test]
    fn foreign_key_in_table_is_a_type_mismatch() {
        let engine = MemoryEngine::new();
        let mut batch = WriteBatch::new();
        // A key under the certificate prefix whose suffix is not an address.
        batch.put(CERTIFICATE_TABLE.key(b"bogus"), b"junk".to_vec());
        engine.write(batch).unwrap();

        let store = VersionCertificateStore::with_engine(Box::new(engine));
        let err = store.get_all().unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch(_)));
    }

    #[test]
    fn corrupt_record_bytes_surface_as_decode_error() {
        let engine = MemoryEngine::new();
        let addr = ValidatorAddress::new([5u8; 20]);
        let mut batch = WriteBatch::new();
        batch.put(CERTIFICATE_TABLE.key(addr.as_bytes()), vec![0xDE, 0xAD]);
        engine.write(batch).unwrap();

        let store = VersionCertificateStore::with_engine(Box::new(engine));
        assert!(matches!(store.get(&addr), Err(StoreError::Decode(_))));
        assert!(matches!(store.get_all(), Err(StoreError::Decode(_))));
    }

    #[test]
    fn end_to_end_scenario() {
        let store = mem_store();
        let a1 = cert(1, 1);
        let b1 = cert(2, 1);

        let accepted = store.upsert(vec![a1.clone(), b1.clone()]).unwrap();
        assert_eq!(accepted.len(), 2);
        assert_eq!(store.get_all().unwrap().len(), 2);

        // Stale resubmit: no acceptance, no change.
        assert!(store.upsert(vec![a1.clone()]).unwrap().is_empty());
        assert_eq!(store.get_all().unwrap().len(), 2);

        // Validator set change: only B survives.
        let keep: HashSet<_> = [b1.address].into_iter().collect();
        store.prune(&keep).unwrap();
        let remaining = store.get_all().unwrap();
        assert_eq!(remaining, vec![b1.clone()]);
        assert!(store.get(&a1.address).unwrap_err().is_not_found());
    }

    #[test]
    fn table_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = cert(1, 8);

        let store = VersionCertificateStore::open(Some(dir.path())).expect("open");
        store.upsert(vec![a.clone()]).unwrap();
        store.close().expect("close");

        let store = VersionCertificateStore::open(Some(dir.path())).expect("reopen");
        assert_eq!(store.get(&a.address).unwrap(), a);
        assert_eq!(store.get_version(&a.address).unwrap(), 8);
    }

    #[test]
    fn persistent_store_honors_the_merge_rule() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = VersionCertificateStore::open(Some(dir.path())).expect("open");

        store.upsert(vec![cert(1, 5)]).unwrap();
        assert!(store.upsert(vec![cert(1, 2)]).unwrap().is_empty());
        assert_eq!(store.upsert(vec![cert(1, 9)]).unwrap(), vec![cert(1, 9)]);
        assert_eq!(store.get_version(&cert(1, 9).address).unwrap(), 9);
    }
}
