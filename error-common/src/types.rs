use serde::Serialize;
use thiserror::Error;

use crate::codes::ErrorCode;

/// Workspace-level error used at binary and integration boundaries.
///
/// Crate errors convert into this type through `From` impls in their own
/// crates; the code of the original error is preserved.
#[derive(Error, Debug)]
pub enum NightingaleError {
    /// Consent capture or consent checks failed
    #[error("Consent error [{code}]: {message}")]
    Consent { code: &'static str, message: String },

    /// Credential issuance or verification failed
    #[error("Authentication error [{code}]: {message}")]
    Auth { code: &'static str, message: String },

    /// The redaction engine withheld output or could not be constructed
    #[error("Redaction error [{code}]: {message}")]
    Redaction { code: &'static str, message: String },

    /// Provenance mapping failed
    #[error("Provenance error [{code}]: {message}")]
    Provenance { code: &'static str, message: String },

    /// Session orchestration failed
    #[error("Pipeline error [{code}]: {message}")]
    Pipeline { code: &'static str, message: String },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error [{code}]: {message}")]
    Config { code: &'static str, message: String },

    /// Keyed store errors
    #[error("Storage error [{code}]: {message}")]
    Storage { code: &'static str, message: String },

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NightingaleError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Consent { code, .. }
            | Self::Auth { code, .. }
            | Self::Redaction { code, .. }
            | Self::Provenance { code, .. }
            | Self::Pipeline { code, .. }
            | Self::Config { code, .. }
            | Self::Storage { code, .. } => code,
            Self::Other(_) => "INTERNAL_9001",
        }
    }

    /// Serializable view for API responses and CLI output.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

impl ErrorCode for NightingaleError {
    fn code(&self) -> &'static str {
        NightingaleError::code(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
}

/// Result type alias for Nightingale operations
pub type Result<T> = std::result::Result<T, NightingaleError>;

/// Log an error by code only. Messages may quote configuration values, so
/// they go to debug level.
pub fn log_error(context: &str, error: &NightingaleError) {
    tracing::error!(context = context, error_code = error.code(), "Nightingale error occurred");
    tracing::debug!(context = context, error = %error, "Nightingale error detail");
}
