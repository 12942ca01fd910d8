//! Ed25519 message signing and verification.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use herald_types::{KeyPair, PrivateKey, PublicKey, Signature, VersionCertificate};

use crate::address::derive_address;

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(message);
    Signature(sig.to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(message, &dalek_sig).is_ok()
}

/// Mint a version certificate announcing `version` for the validator that
/// owns `keypair`.
///
/// The address is derived from the public key and the signature covers the
/// domain-tagged payload from [`VersionCertificate::signing_payload`].
pub fn sign_version_certificate(keypair: &KeyPair, version: u64) -> VersionCertificate {
    let payload = VersionCertificate::signing_payload(version);
    let signature = sign_message(&payload, &keypair.private);
    VersionCertificate::new(
        derive_address(&keypair.public),
        keypair.public.clone(),
        version,
        signature,
    )
}
