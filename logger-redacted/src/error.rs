use error_common::{codes, ErrorCode, NightingaleError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("Scrubber pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Tracing subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

impl ErrorCode for LoggerError {
    fn code(&self) -> &'static str {
        codes::configuration::INVALID_CONFIG
    }
}

impl From<LoggerError> for NightingaleError {
    fn from(error: LoggerError) -> Self {
        NightingaleError::Config {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoggerError>;
