use error_common::{codes, ErrorCode, NightingaleError};
use thiserror::Error;

/// Keys are never echoed in these errors; callers add their own context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Key already exists")]
    KeyExists,

    #[error("Key not found")]
    KeyNotFound,
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            StoreError::KeyExists => codes::storage::KEY_EXISTS,
            StoreError::KeyNotFound => codes::storage::KEY_NOT_FOUND,
        }
    }
}

impl From<StoreError> for NightingaleError {
    fn from(error: StoreError) -> Self {
        NightingaleError::Storage {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
