//! LMDB implementation of the key-value engine.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use herald_store::{BatchOp, KvEngine, StoreError, WriteBatch};

use crate::LmdbError;

/// Key in the meta database holding the schema-version stamp.
const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Default LMDB map size (256 MiB). The discovery table holds one small
/// record per validator, so this is far above any realistic working set.
const MAP_SIZE: usize = 256 * 1024 * 1024;

/// Named LMDB databases inside the environment. Records and internal
/// bookkeeping live in separate databases so record iteration can never
/// observe meta keys.
const RECORDS_DB: &str = "records";
const META_DB: &str = "meta";

/// An LMDB-backed [`KvEngine`].
#[derive(Debug)]
pub struct LmdbEngine {
    env: Env,
    records_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEngine {
    /// Open or create an LMDB environment at `path`.
    ///
    /// `schema_version` is the on-disk layout the caller expects: a fresh
    /// database is stamped with it, and an existing database carrying a
    /// different stamp is refused rather than silently misread. Migration
    /// logic, when a layout change ever happens, belongs here in the engine.
    pub fn open(path: &Path, schema_version: u32) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path).map_err(LmdbError::from)?;

        // Safety: the environment is opened once per path per process; no
        // other mapping of this file exists with conflicting flags.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(MAP_SIZE)
                .max_dbs(2)
                .open(path)
                .map_err(LmdbError::from)?
        };

        let mut wtxn = env.write_txn().map_err(LmdbError::from)?;
        let records_db = env
            .create_database(&mut wtxn, Some(RECORDS_DB))
            .map_err(LmdbError::from)?;
        let meta_db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, Some(META_DB))
            .map_err(LmdbError::from)?;

        match meta_db
            .get(&wtxn, SCHEMA_VERSION_KEY)
            .map_err(LmdbError::from)?
        {
            None => {
                meta_db
                    .put(&mut wtxn, SCHEMA_VERSION_KEY, &schema_version.to_le_bytes())
                    .map_err(LmdbError::from)?;
                tracing::info!(path = %path.display(), version = schema_version, "stamped fresh database");
            }
            Some(bytes) if bytes == schema_version.to_le_bytes().as_slice() => {
                tracing::debug!(path = %path.display(), version = schema_version, "opened database");
            }
            Some(bytes) => {
                let stored = match <[u8; 4]>::try_from(bytes) {
                    Ok(arr) => u32::from_le_bytes(arr).to_string(),
                    Err(_) => "corrupt".to_string(),
                };
                tracing::warn!(path = %path.display(), stored = %stored, expected = schema_version, "refusing database with mismatched schema");
                return Err(LmdbError::Schema(format!(
                    "stored version {} does not match expected version {}",
                    stored, schema_version
                ))
                .into());
            }
        }
        wtxn.commit().map_err(LmdbError::from)?;

        Ok(Self {
            env,
            records_db,
            meta_db,
        })
    }

    /// The schema-version stamp currently stored in the environment.
    pub fn schema_version(&self) -> Result<u32, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .meta_db
            .get(&rtxn, SCHEMA_VERSION_KEY)
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::Backend("schema version stamp missing".into()))?;
        let arr: [u8; 4] = bytes
            .try_into()
            .map_err(|_| StoreError::Backend("schema version stamp has wrong length".into()))?;
        Ok(u32::from_le_bytes(arr))
    }
}

impl KvEngine for LmdbEngine {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .records_db
            .get(&rtxn, key)
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::NotFound(format!("{} byte key", key.len())))?;
        Ok(val.to_vec())
    }

    fn write(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { key, value } => {
                    self.records_db
                        .put(&mut wtxn, &key, &value)
                        .map_err(LmdbError::from)?;
                }
                BatchOp::Delete { key } => {
                    self.records_db
                        .delete(&mut wtxn, &key)
                        .map_err(LmdbError::from)?;
                }
            }
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iterate(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .records_db
            .prefix_iter(&rtxn, prefix)
            .map_err(LmdbError::from)?;
        for entry in iter {
            let (key, value) = entry.map_err(LmdbError::from)?;
            visit(key, value)?;
        }
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        self.env.force_sync().map_err(LmdbError::from)?;
        Ok(())
    }
}
