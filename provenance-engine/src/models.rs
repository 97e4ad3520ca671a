use chrono::{DateTime, Utc};
use phi_redaction::RedactedText;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time window of one transcript segment, in seconds from recording start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceTimestamp {
    pub start_time: f64,
    pub end_time: f64,
}

impl SourceTimestamp {
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self {
            start_time,
            end_time,
        }
    }
}

/// Stable reference id ("S1", "S2", ...) and the window it points at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub ref_id: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// A processed chunk bound to its source. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvenanceSpan {
    pub chunk_id: Uuid,
    pub session_id: Uuid,
    pub text: RedactedText,
    pub start_time: f64,
    pub end_time: f64,
    pub source_refs: Vec<SourceRef>,
    /// Set when no timestamps were supplied and the nominal window was used
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
}

impl ProvenanceSpan {
    pub fn ref_ids(&self) -> Vec<&str> {
        self.source_refs.iter().map(|r| r.ref_id.as_str()).collect()
    }
}

/// Result of resolving a reference id within a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRef {
    pub chunk_id: Uuid,
    pub source: SourceRef,
}
