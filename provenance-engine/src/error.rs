use error_common::{codes, ErrorCode, NightingaleError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProvenanceError {
    #[error("Invalid source timestamp at index {index}: {reason}")]
    InvalidTimestamp { index: usize, reason: &'static str },

    #[error("Chunk id already mapped")]
    DuplicateChunk,
}

impl ErrorCode for ProvenanceError {
    fn code(&self) -> &'static str {
        match self {
            ProvenanceError::InvalidTimestamp { .. } => codes::provenance::INVALID_TIMESTAMP,
            ProvenanceError::DuplicateChunk => codes::provenance::DUPLICATE_CHUNK,
        }
    }
}

impl From<ProvenanceError> for NightingaleError {
    fn from(error: ProvenanceError) -> Self {
        NightingaleError::Provenance {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvenanceError>;
