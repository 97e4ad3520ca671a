use error_common::{codes, ErrorCode, NightingaleError};
use thiserror::Error;

/// Failure raised by a single detector. Never carries input text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("detector '{detector}' failed: {reason}")]
pub struct DetectorError {
    pub detector: &'static str,
    pub reason: String,
}

impl DetectorError {
    pub fn new(detector: &'static str, reason: impl Into<String>) -> Self {
        Self {
            detector,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedactionError {
    /// Output was withheld; the reason is for logs only
    #[error("Redaction failed: {reason}")]
    RedactionFailure { reason: String },

    #[error("Detector setup failed: {0}")]
    DetectorSetup(String),
}

impl RedactionError {
    /// Message safe to show to end users
    pub fn user_message(&self) -> &'static str {
        "Processing unavailable"
    }
}

impl From<regex::Error> for RedactionError {
    fn from(error: regex::Error) -> Self {
        RedactionError::DetectorSetup(error.to_string())
    }
}

impl ErrorCode for RedactionError {
    fn code(&self) -> &'static str {
        match self {
            RedactionError::RedactionFailure { .. } => codes::redaction::REDACTION_FAILURE,
            RedactionError::DetectorSetup(_) => codes::redaction::DETECTOR_SETUP,
        }
    }
}

impl From<RedactionError> for NightingaleError {
    fn from(error: RedactionError) -> Self {
        NightingaleError::Redaction {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RedactionError>;
