//! Ed25519 key generation.

use ed25519_dalek::SigningKey;
use herald_types::{KeyPair, PrivateKey, PublicKey};
use rand::rngs::OsRng;

/// Generate a new Ed25519 key pair from a secure random source.
pub fn generate_keypair() -> KeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key = signing_key.verifying_key();
    KeyPair {
        public: PublicKey(verifying_key.to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    let verifying_key = signing_key.verifying_key();
    PublicKey(verifying_key.to_bytes())
}

/// Check that public key bytes decode to a valid Ed25519 curve point.
pub fn validate_public_key(public: &PublicKey) -> bool {
    ed25519_dalek::VerifyingKey::from_bytes(&public.0).is_ok()
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    let verifying_key = signing_key.verifying_key();
    KeyPair {
        public: PublicKey(verifying_key.to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_derivation_is_deterministic() {
        let a = keypair_from_seed(&[42u8; 32]);
        let b = keypair_from_seed(&[42u8; 32]);
        assert_eq!(a.public, b.public);
    }

    #[test]
    fn public_matches_private() {
        let kp = keypair_from_seed(&[7u8; 32]);
        assert_eq!(public_from_private(&kp.private), kp.public);
    }

    #[test]
    fn generated_keys_are_valid_points() {
        let kp = keypair_from_seed(&[3u8; 32]);
        assert!(validate_public_key(&kp.public));
        assert!(!validate_public_key(&PublicKey([0xFF; 32])));
    }
}
