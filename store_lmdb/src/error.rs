use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("schema version mismatch: {0}")]
    Schema(String),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<std::io::Error> for LmdbError {
    fn from(e: std::io::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<LmdbError> for herald_store::StoreError {
    fn from(e: LmdbError) -> Self {
        herald_store::StoreError::Backend(e.to_string())
    }
}
