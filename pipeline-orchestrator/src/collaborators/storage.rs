use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use error_common::ComponentHealth;
use memory_store::KeyedStore;
use phi_redaction::RedactionAudit;
use provenance_engine::ProvenanceSpan;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CollaboratorError;
use crate::session::GroundedStatement;

/// What a completed session persists: redacted chunks with their
/// provenance, grounded statements and redaction audits.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationRecord {
    pub session_id: Uuid,
    pub hashed_subject_id: String,
    pub chunks: Vec<ProvenanceSpan>,
    pub statements: Vec<GroundedStatement>,
    pub redaction_audits: Vec<RedactionAudit>,
    pub completed_at: DateTime<Utc>,
}

#[async_trait]
pub trait ConsultationStore: Send + Sync {
    /// Append or merge a record under its session id
    async fn append(&self, session_id: Uuid, record: &ConsultationRecord) -> Result<(), CollaboratorError>;

    async fn health(&self) -> ComponentHealth {
        ComponentHealth::healthy("consultation_store")
    }
}

/// Explicit retention window; the only way records are deleted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionPolicy {
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
}

fn default_max_age_days() -> i64 {
    30
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredConsultation {
    pub records: Vec<ConsultationRecord>,
    pub first_appended_at: DateTime<Utc>,
    pub last_appended_at: DateTime<Utc>,
}

/// Session-keyed in-memory store. Appends for one session merge in order.
#[derive(Clone, Default)]
pub struct InMemoryConsultationStore {
    consultations: KeyedStore<Uuid, StoredConsultation>,
}

impl InMemoryConsultationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: Uuid) -> Option<StoredConsultation> {
        self.consultations.get(&session_id)
    }

    pub fn session_count(&self) -> usize {
        self.consultations.len()
    }

    /// Delete consultations last written before `now - max_age_days`.
    pub fn apply_retention(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> usize {
        let cutoff = now
            .checked_sub_signed(Duration::days(policy.max_age_days))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let removed = self
            .consultations
            .remove_where(|_, stored| stored.last_appended_at < cutoff);

        tracing::info!(
            removed,
            max_age_days = policy.max_age_days,
            "Consultation retention applied"
        );
        removed
    }

    fn append_at(&self, session_id: Uuid, record: &ConsultationRecord, now: DateTime<Utc>) {
        self.consultations.merge_or_insert_with(
            session_id,
            || StoredConsultation {
                records: Vec::new(),
                first_appended_at: now,
                last_appended_at: now,
            },
            |stored| {
                stored.records.push(record.clone());
                stored.last_appended_at = now;
            },
        );
    }
}

#[async_trait]
impl ConsultationStore for InMemoryConsultationStore {
    async fn append(&self, session_id: Uuid, record: &ConsultationRecord) -> Result<(), CollaboratorError> {
        self.append_at(session_id, record, Utc::now());
        tracing::debug!(session_id = %session_id, "Consultation record appended");
        Ok(())
    }
}
