//! The conflict-resolution rule for competing version certificates.
//!
//! Kept as a pure function so the rule is unit-testable without storage.
//! The rule is commutative and idempotent across calls: whatever order
//! competing certificates arrive in, the highest version ends up stored.

use herald_types::VersionCertificate;

/// Outcome of comparing a candidate certificate against the current record
/// for the same address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// No record exists for this address; store the candidate.
    Insert,
    /// The candidate's version is strictly higher; replace the record.
    Replace,
    /// The candidate's version is not higher; keep the existing record.
    /// A normal outcome, not an error.
    Skip,
}

impl Decision {
    pub fn accepts(&self) -> bool {
        !matches!(self, Decision::Skip)
    }
}

/// Decide whether `candidate` supersedes `existing`.
///
/// Strictly-greater comparison everywhere: an equal version never replaces,
/// so resubmitting a stored certificate is a no-op and the first accepted
/// candidate wins among equal-max versions within a batch.
pub fn decide(existing: Option<&VersionCertificate>, candidate: &VersionCertificate) -> Decision {
    match existing {
        None => Decision::Insert,
        Some(current) if candidate.version > current.version => Decision::Replace,
        Some(_) => Decision::Skip,
    }
}
