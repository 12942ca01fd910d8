//! Cryptographic primitives for herald.
//!
//! - **Ed25519** for signing and signature verification
//! - **Blake2b** for hashing and validator address derivation
//!
//! The discovery store itself never signs or verifies; these helpers serve
//! the node's own announcements, the network layer that authenticates
//! incoming gossip, and test fixtures.

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::derive_address;
pub use hash::blake2b_256;
pub use keys::{generate_keypair, keypair_from_seed, public_from_private, validate_public_key};
pub use sign::{sign_message, sign_version_certificate, verify_signature};
