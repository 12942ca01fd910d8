//! Version certificates: signed validator reachability announcements.

use crate::{PublicKey, Signature, ValidatorAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain tag mixed into the signing payload so a certificate signature can
/// never be confused with a signature over other protocol messages.
const SIGNING_DOMAIN: &[u8] = b"herald-version-certificate";

/// A validator's signed claim "at version V, I am reachable as described by
/// this signature".
///
/// Certificates propagate by gossip. `version` is a per-validator counter
/// that only increases over the validator's lifetime and is the sole field
/// used to resolve conflicting claims about the same identity. The network
/// layer verifies `signature` before a certificate reaches storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCertificate {
    pub address: ValidatorAddress,
    pub public_key: PublicKey,
    pub version: u64,
    pub signature: Signature,
}

impl VersionCertificate {
    pub fn new(
        address: ValidatorAddress,
        public_key: PublicKey,
        version: u64,
        signature: Signature,
    ) -> Self {
        Self {
            address,
            public_key,
            version,
            signature,
        }
    }

    /// The exact bytes a validator signs when announcing `version`.
    pub fn signing_payload(version: u64) -> Vec<u8> {
        let mut payload = Vec::with_capacity(SIGNING_DOMAIN.len() + 8);
        payload.extend_from_slice(SIGNING_DOMAIN);
        payload.extend_from_slice(&version.to_be_bytes());
        payload
    }
}

impl fmt::Display for VersionCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{address: {}, version: {}}}", self.address, self.version)
    }
}
