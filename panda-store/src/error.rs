use panda_core::PandaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Other(String),
}

/// Storage failures surface to the service layer unchanged, as strings.
impl From<StoreError> for PandaError {
    fn from(err: StoreError) -> Self {
        PandaError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
