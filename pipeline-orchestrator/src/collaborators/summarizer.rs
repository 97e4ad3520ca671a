use async_trait::async_trait;
use error_common::ComponentHealth;
use phi_redaction::RedactedText;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CollaboratorError;

/// One redacted chunk and the reference ids that point into it
#[derive(Debug, Clone, Serialize)]
pub struct SummarySegment {
    pub text: RedactedText,
    pub reference_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryMetadata {
    pub session_id: Uuid,
    pub language: Option<String>,
    pub segment_count: usize,
}

/// Redacted session text offered for summarization
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRequest {
    pub segments: Vec<SummarySegment>,
    pub metadata: SummaryMetadata,
    pub available_refs: Vec<String>,
}

/// A generated statement and the reference ids it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatement {
    pub text: String,
    #[serde(default)]
    pub reference_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub statements: Vec<SummaryStatement>,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse, CollaboratorError>;

    async fn health(&self) -> ComponentHealth {
        ComponentHealth::healthy("summarizer")
    }
}
