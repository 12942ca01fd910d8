//! Storage-engine interface for herald.
//!
//! Every storage backend (LMDB, in-memory for private instances and tests)
//! implements [`KvEngine`]. The crates above this one depend only on the
//! trait: point lookups, atomic batched writes, prefix iteration, close.

pub mod engine;
pub mod error;
pub mod memory;
pub mod table;

pub use engine::{BatchOp, KvEngine, WriteBatch};
pub use error::StoreError;
pub use memory::MemoryEngine;
pub use table::Table;
