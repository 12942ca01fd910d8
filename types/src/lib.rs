//! Fundamental types for the herald validator-discovery component.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: validator addresses, key material, and the version certificate
//! record that the discovery table stores and the network layer gossips.

pub mod address;
pub mod certificate;
pub mod keys;

pub use address::ValidatorAddress;
pub use certificate::VersionCertificate;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
