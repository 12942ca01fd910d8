use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("malformed stored record: {0}")]
    Decode(String),

    #[error("stored public key is not a valid curve point: {0}")]
    InvalidPublicKey(String),

    #[error("wrong record kind in storage plumbing: {0}")]
    TypeMismatch(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
