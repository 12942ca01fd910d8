//! Canonical binary codec for persisted version certificates.
//!
//! A stored record is the ordered 4-field tuple (address, public key,
//! version, signature), bincode-encoded. The address and public key
//! duplicate what the gossip layer already authenticated, but they are part
//! of the stable on-disk layout: dropping them would change the byte format
//! for every existing database, so any slimmer encoding needs a schema
//! version bump and an engine migration first.

use herald_crypto::validate_public_key;
use herald_store::StoreError;
use herald_types::VersionCertificate;

/// Encode a certificate into its canonical stored form.
///
/// The same logical record always encodes to the same bytes, so storage
/// diffs and equality checks on the encoded form are meaningful.
pub fn encode(cert: &VersionCertificate) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(cert).map_err(|e| StoreError::Decode(format!("encode: {}", e)))
}

/// Decode a stored certificate.
///
/// Truncated or malformed bytes produce `StoreError::Decode`; bytes that
/// parse but carry a public key that is not a valid Ed25519 point produce
/// the distinct `StoreError::InvalidPublicKey`. The signature is never
/// verified here; that happened before the record was stored.
pub fn decode(bytes: &[u8]) -> Result<VersionCertificate, StoreError> {
    let cert: VersionCertificate =
        bincode::deserialize(bytes).map_err(|e| StoreError::Decode(e.to_string()))?;
    if !validate_public_key(&cert.public_key) {
        return Err(StoreError::InvalidPublicKey(format!(
            "certificate for {}",
            cert.address
        )));
    }
    Ok(cert)
}
