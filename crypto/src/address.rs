//! Validator address derivation from public keys.
//!
//! A validator address is the last 20 bytes of the Blake2b-256 hash of the
//! raw public key. The discovery table and the rest of the protocol treat it
//! as an opaque fixed-size identifier.

use crate::hash::blake2b_256;
use herald_types::{PublicKey, ValidatorAddress};

/// Derive the validator address for a public key.
pub fn derive_address(public_key: &PublicKey) -> ValidatorAddress {
    let digest = blake2b_256(public_key.as_bytes());
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&digest[12..]);
    ValidatorAddress::new(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let pk = PublicKey([9u8; 32]);
        assert_eq!(derive_address(&pk), derive_address(&pk));
    }

    #[test]
    fn different_keys_get_different_addresses() {
        let a = derive_address(&PublicKey([1u8; 32]));
        let b = derive_address(&PublicKey([2u8; 32]));
        assert_ne!(a, b);
    }
}
