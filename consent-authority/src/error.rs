use error_common::{codes, ErrorCode, NightingaleError};
use thiserror::Error;

use crate::consent::ConsentFlag;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Minimum consent not granted (missing: {})", join_flags(.missing))]
    ConsentInsufficient { missing: Vec<ConsentFlag> },

    #[error("Unknown consent flag: {0}")]
    UnknownConsentKey(String),

    #[error("Consent flag {flag} given more than once")]
    DuplicateConsentKey { flag: ConsentFlag },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Subject identifier must not be empty")]
    InvalidSubject,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Refresh not needed ({remaining_secs}s remaining)")]
    RefreshNotNeeded { remaining_secs: i64 },

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Authority configuration error: {0}")]
    Configuration(String),
}

fn join_flags(flags: &[ConsentFlag]) -> String {
    flags
        .iter()
        .map(ConsentFlag::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl AuthError {
    /// Credential failures that require the caller to re-authenticate
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, AuthError::TokenInvalid(_) | AuthError::TokenExpired)
    }
}

impl ErrorCode for AuthError {
    fn code(&self) -> &'static str {
        match self {
            AuthError::ConsentInsufficient { .. } => codes::consent::CONSENT_INSUFFICIENT,
            AuthError::UnknownConsentKey(_) => codes::consent::UNKNOWN_CONSENT_KEY,
            AuthError::DuplicateConsentKey { .. } => codes::consent::DUPLICATE_CONSENT_KEY,
            AuthError::UnknownOperation(_) => codes::consent::UNKNOWN_OPERATION,
            AuthError::InvalidSubject => codes::authentication::SUBJECT_MISMATCH,
            AuthError::TokenInvalid(_) => codes::authentication::TOKEN_INVALID,
            AuthError::TokenExpired => codes::authentication::TOKEN_EXPIRED,
            AuthError::RefreshNotNeeded { .. } => codes::authentication::REFRESH_NOT_NEEDED,
            AuthError::Signing(_) => codes::authentication::SIGNING_FAILED,
            AuthError::Configuration(_) => codes::configuration::INVALID_CONFIG,
        }
    }
}

impl From<AuthError> for NightingaleError {
    fn from(error: AuthError) -> Self {
        let code = error.code();
        let message = error.to_string();
        match error {
            AuthError::ConsentInsufficient { .. }
            | AuthError::UnknownConsentKey(_)
            | AuthError::DuplicateConsentKey { .. }
            | AuthError::UnknownOperation(_) => NightingaleError::Consent { code, message },
            AuthError::Configuration(_) => NightingaleError::Config { code, message },
            _ => NightingaleError::Auth { code, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
