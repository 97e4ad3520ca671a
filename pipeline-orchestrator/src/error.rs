use consent_authority::{AuthError, Operation};
use error_common::{codes, ErrorCode, NightingaleError};
use memory_store::StoreError;
use provenance_engine::ProvenanceError;
use thiserror::Error;

use crate::session::PipelineStage;

/// Failure reported by an external collaborator (transcription,
/// summarization, storage).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

impl CollaboratorError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CollaboratorError::Timeout { .. } | CollaboratorError::Unavailable(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Operation '{operation}' is not permitted by the session's consent")]
    ConsentDenied { operation: Operation },

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session consent was revoked")]
    SessionRevoked,

    #[error("Session halted after stage {last_completed}")]
    SessionHalted { last_completed: PipelineStage },

    #[error("Another operation is in flight for this session")]
    SessionBusy,

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition {
        from: PipelineStage,
        to: PipelineStage,
    },

    #[error("Session is still active in stage {stage}")]
    SessionActive { stage: PipelineStage },

    /// The redaction engine withheld its output; details are only logged
    #[error("Processing unavailable")]
    RedactionFailure { last_completed: PipelineStage },

    #[error("Provenance mapping failed after stage {last_completed}: {source}")]
    Provenance {
        last_completed: PipelineStage,
        #[source]
        source: ProvenanceError,
    },

    #[error("{stage} failed after stage {last_completed}: {source}")]
    StageFailed {
        stage: PipelineStage,
        last_completed: PipelineStage,
        #[source]
        source: CollaboratorError,
    },

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("Pipeline setup failed: {0}")]
    Setup(String),
}

impl PipelineError {
    /// Whether resubmitting (in a new session where halted) may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::SessionBusy => true,
            PipelineError::StageFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Stage to resubmit from, for errors that halted the session
    pub fn last_completed(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::SessionHalted { last_completed }
            | PipelineError::RedactionFailure { last_completed }
            | PipelineError::Provenance { last_completed, .. }
            | PipelineError::StageFailed { last_completed, .. } => Some(*last_completed),
            _ => None,
        }
    }

    /// Message safe to show to end users; never includes input text
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::Auth(AuthError::TokenExpired) => "Session expired; please sign in again",
            PipelineError::Auth(AuthError::ConsentInsufficient { .. }) => {
                "Recording, transcription and AI processing consent are required"
            }
            PipelineError::Auth(_) => "Authentication failed; please sign in again",
            PipelineError::ConsentDenied { .. } => "This operation is not covered by the patient's consent",
            PipelineError::SessionNotFound => "Session not found",
            PipelineError::SessionRevoked => "Consent was revoked for this session",
            PipelineError::SessionHalted { .. } => "This session was halted; start a new session",
            PipelineError::SessionBusy => "The session is busy; try again shortly",
            PipelineError::InvalidTransition { .. } | PipelineError::SessionActive { .. } => {
                "Operation not allowed at this point of the session"
            }
            PipelineError::RedactionFailure { .. } | PipelineError::Provenance { .. } => {
                "Processing unavailable"
            }
            PipelineError::StageFailed { .. } => "An external service failed; start a new session",
            PipelineError::Store(_) | PipelineError::Setup(_) => "Internal error",
        }
    }
}

impl ErrorCode for PipelineError {
    fn code(&self) -> &'static str {
        match self {
            PipelineError::Auth(error) => error.code(),
            PipelineError::ConsentDenied { .. } => codes::consent::CONSENT_DENIED,
            PipelineError::SessionNotFound => codes::pipeline::SESSION_NOT_FOUND,
            PipelineError::SessionRevoked => codes::pipeline::SESSION_REVOKED,
            PipelineError::SessionHalted { .. } => codes::pipeline::SESSION_HALTED,
            PipelineError::SessionBusy => codes::pipeline::SESSION_BUSY,
            PipelineError::InvalidTransition { .. } | PipelineError::SessionActive { .. } => {
                codes::pipeline::INVALID_TRANSITION
            }
            PipelineError::RedactionFailure { .. } => codes::redaction::REDACTION_FAILURE,
            PipelineError::Provenance { source, .. } => source.code(),
            PipelineError::StageFailed { .. } => codes::pipeline::EXTERNAL_STAGE_FAILED,
            PipelineError::Store(error) => error.code(),
            PipelineError::Setup(_) => codes::configuration::INVALID_CONFIG,
        }
    }
}

impl From<PipelineError> for NightingaleError {
    fn from(error: PipelineError) -> Self {
        match error {
            PipelineError::Auth(auth) => auth.into(),
            PipelineError::RedactionFailure { .. } => NightingaleError::Redaction {
                code: codes::redaction::REDACTION_FAILURE,
                message: error.to_string(),
            },
            other => NightingaleError::Pipeline {
                code: other.code(),
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        assert!(CollaboratorError::Timeout { after_ms: 10 }.is_retryable());
        assert!(CollaboratorError::Unavailable("503".into()).is_retryable());
        assert!(!CollaboratorError::Rejected("bad input".into()).is_retryable());

        let failed = PipelineError::StageFailed {
            stage: PipelineStage::Transcribed,
            last_completed: PipelineStage::Recording,
            source: CollaboratorError::Timeout { after_ms: 10 },
        };
        assert!(failed.is_retryable());
        assert_eq!(failed.last_completed(), Some(PipelineStage::Recording));
        assert!(!PipelineError::SessionRevoked.is_retryable());
    }

    #[test]
    fn test_redaction_failure_message_is_generic() {
        let error = PipelineError::RedactionFailure {
            last_completed: PipelineStage::Transcribed,
        };
        assert_eq!(error.to_string(), "Processing unavailable");
        assert_eq!(error.user_message(), "Processing unavailable");
        assert_eq!(error.code(), "REDACT_3001");
    }
}
