//! LMDB storage backend for herald.
//!
//! Implements the [`herald_store::KvEngine`] trait using the `heed` LMDB
//! bindings. Every write batch commits as its own LMDB write transaction
//! (the only fsync in the batch), so batches are independently atomic and
//! never coalesced with another caller's writes.

pub mod engine;
pub mod error;

pub use engine::LmdbEngine;
pub use error::LmdbError;
