//! Validator discovery table for a BFT network.
//!
//! Each validator periodically self-signs a *version certificate* announcing
//! its current reachability version; certificates spread by gossip. This
//! crate maintains the persistent per-validator table of the highest-version
//! certificate seen, with last-writer-wins-by-version merge semantics,
//! atomic batch updates, and membership pruning when the validator set
//! changes.
//!
//! The table never verifies signatures; the network layer authenticates a
//! certificate before handing it to [`VersionCertificateStore::upsert`].

pub mod codec;
pub mod merge;
pub mod store;

pub use merge::{decide, Decision};
pub use store::{CertificateInfo, VersionCertificateStore, CERTIFICATE_SCHEMA_VERSION};
