//! Validator address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 20-byte validator address.
///
/// Derived from the validator's public key via Blake2b hashing (see
/// `herald_crypto::derive_address`). The discovery table treats it as an
/// opaque unique key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidatorAddress([u8; 20]);

impl ValidatorAddress {
    pub const LEN: usize = 20;

    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address from a byte slice. Returns `None` if the slice is
    /// not exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 20] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex form, as exposed over RPC.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for ValidatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorAddress({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ValidatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

// Inline hex encoding to avoid adding the `hex` crate as a dependency of types.
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_accepts_exactly_20_bytes() {
        assert!(ValidatorAddress::from_slice(&[7u8; 20]).is_some());
        assert!(ValidatorAddress::from_slice(&[7u8; 19]).is_none());
        assert!(ValidatorAddress::from_slice(&[7u8; 21]).is_none());
        assert!(ValidatorAddress::from_slice(&[]).is_none());
    }

    #[test]
    fn hex_rendering() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xAB;
        bytes[19] = 0x01;
        let addr = ValidatorAddress::new(bytes);
        let hex = addr.to_hex();
        assert!(hex.starts_with("0xab"));
        assert!(hex.ends_with("01"));
        assert_eq!(hex.len(), 2 + 40);
        assert_eq!(hex, addr.to_string());
    }

    #[test]
    fn usable_as_map_key() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(ValidatorAddress::new([1u8; 20]));
        set.insert(ValidatorAddress::new([1u8; 20]));
        set.insert(ValidatorAddress::new([2u8; 20]));
        assert_eq!(set.len(), 2);
    }
}
