use chrono::{DateTime, Utc};
use consent_authority::ConsentGrant;
use memory_store::KeyedStore;
use phi_redaction::RedactionAudit;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Forward-only session stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Unauthenticated,
    Authenticated,
    Recording,
    Transcribed,
    Redacted,
    Summarized,
    Completed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Unauthenticated => "unauthenticated",
            PipelineStage::Authenticated => "authenticated",
            PipelineStage::Recording => "recording",
            PipelineStage::Transcribed => "transcribed",
            PipelineStage::Redacted => "redacted",
            PipelineStage::Summarized => "summarized",
            PipelineStage::Completed => "completed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why and where a session stopped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HaltRecord {
    pub last_completed: PipelineStage,
    pub error_code: &'static str,
    pub halted_at: DateTime<Utc>,
}

/// A summary statement that cites at least one known reference id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundedStatement {
    pub text: String,
    pub reference_ids: Vec<String>,
}

/// Per-session state. Holds no raw transcript text.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineContext {
    pub session_id: Uuid,
    pub hashed_subject_id: String,
    pub stage: PipelineStage,
    pub consent: ConsentGrant,
    pub halted: Option<HaltRecord>,
    pub revoked: bool,
    #[serde(skip)]
    pub(crate) in_flight: bool,
    pub chunk_ids: Vec<Uuid>,
    /// Spoken language reported with the first transcribed chunk
    pub language: Option<String>,
    pub redaction_audits: Vec<RedactionAudit>,
    pub statements: Vec<GroundedStatement>,
    pub summary_skipped: bool,
    pub stored: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PipelineContext {
    pub(crate) fn new(session_id: Uuid, hashed_subject_id: String, consent: ConsentGrant) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            hashed_subject_id,
            stage: PipelineStage::Authenticated,
            consent,
            halted: None,
            revoked: false,
            in_flight: false,
            chunk_ids: Vec::new(),
            language: None,
            redaction_audits: Vec::new(),
            statements: Vec::new(),
            summary_skipped: false,
            stored: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Revoked, halted and completed sessions accept no further stages
    pub fn is_terminal(&self) -> bool {
        self.revoked || self.halted.is_some() || self.stage == PipelineStage::Completed
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Clears a session's in-flight claim on every exit path.
pub(crate) struct InFlightGuard {
    sessions: KeyedStore<Uuid, PipelineContext>,
    session_id: Uuid,
}

impl InFlightGuard {
    pub(crate) fn new(sessions: KeyedStore<Uuid, PipelineContext>, session_id: Uuid) -> Self {
        Self {
            sessions,
            session_id,
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        // The session may already have been closed
        let _ = self.sessions.merge(&self.session_id, |context| {
            context.in_flight = false;
        });
    }
}
