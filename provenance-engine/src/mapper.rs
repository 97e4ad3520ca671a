use chrono::Utc;
use error_common::{codes, ComponentHealth};
use memory_store::KeyedStore;
use phi_redaction::RedactedText;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::ProvenanceConfig;
use crate::error::{ProvenanceError, Result};
use crate::models::{ProvenanceSpan, ResolvedRef, SourceRef, SourceTimestamp};

/// Append-only provenance for one session
#[derive(Debug, Clone, Default)]
struct SessionProvenance {
    spans: Vec<ProvenanceSpan>,
    by_chunk: HashMap<Uuid, usize>,
    refs: HashMap<String, (Uuid, SourceRef)>,
    ref_order: Vec<String>,
    refs_assigned: u64,
}

impl SessionProvenance {
    fn next_ref_id(&mut self) -> String {
        self.refs_assigned = self.refs_assigned.saturating_add(1);
        format!("S{}", self.refs_assigned)
    }
}

/// Binds redacted chunks to timestamped source spans.
///
/// Reference ids are numbered per session in assignment order, so each id
/// resolves to exactly one chunk of its session. Sessions are independent;
/// writers for one session are serialized by that session's key lock.
pub struct ProvenanceMapper {
    sessions: KeyedStore<Uuid, SessionProvenance>,
    config: ProvenanceConfig,
}

impl ProvenanceMapper {
    pub fn new(config: ProvenanceConfig) -> Self {
        Self {
            sessions: KeyedStore::new(),
            config,
        }
    }

    /// Map a redacted chunk into the session's provenance.
    pub fn map(
        &self,
        text: RedactedText,
        timestamps: &[SourceTimestamp],
        session_id: Uuid,
    ) -> Result<ProvenanceSpan> {
        validate_timestamps(timestamps)?;

        let chunk_id = Uuid::new_v4();
        let degraded = timestamps.is_empty();
        let nominal = SourceTimestamp::new(self.config.nominal_start_secs, self.config.nominal_end_secs);
        let first = timestamps.first().copied().unwrap_or(nominal);
        let ref_count = timestamps.len().clamp(1, self.config.max_refs_per_chunk.max(1));

        let span = self.sessions.merge_or_insert_with(
            session_id,
            SessionProvenance::default,
            |session| -> Result<ProvenanceSpan> {
                if session.by_chunk.contains_key(&chunk_id) {
                    return Err(ProvenanceError::DuplicateChunk);
                }

                let source_refs: Vec<SourceRef> = (0..ref_count)
                    .map(|i| {
                        let window = timestamps.get(i).copied().unwrap_or(nominal);
                        SourceRef {
                            ref_id: session.next_ref_id(),
                            start_time: window.start_time,
                            end_time: window.end_time,
                        }
                    })
                    .collect();

                let span = ProvenanceSpan {
                    chunk_id,
                    session_id,
                    text,
                    start_time: first.start_time,
                    end_time: first.end_time,
                    source_refs,
                    degraded,
                    created_at: Utc::now(),
                };

                for source in &span.source_refs {
                    session
                        .refs
                        .insert(source.ref_id.clone(), (chunk_id, source.clone()));
                    session.ref_order.push(source.ref_id.clone());
                }
                session.by_chunk.insert(chunk_id, session.spans.len());
                session.spans.push(span.clone());
                Ok(span)
            },
        )?;

        if degraded {
            tracing::warn!(
                code = codes::provenance::MAPPING_DEGRADED,
                session_id = %session_id,
                chunk_id = %chunk_id,
                "No source timestamps; nominal window used"
            );
        } else {
            tracing::debug!(
                session_id = %session_id,
                chunk_id = %chunk_id,
                refs = span.source_refs.len(),
                timestamps = timestamps.len(),
                "Chunk mapped"
            );
        }

        Ok(span)
    }

    pub fn get(&self, session_id: Uuid, chunk_id: Uuid) -> Option<ProvenanceSpan> {
        self.sessions
            .merge(&session_id, |session| {
                session
                    .by_chunk
                    .get(&chunk_id)
                    .and_then(|&i| session.spans.get(i))
                    .cloned()
            })
            .ok()
            .flatten()
    }

    /// Spans of a session in assignment order
    pub fn spans(&self, session_id: Uuid) -> Vec<ProvenanceSpan> {
        self.sessions
            .merge(&session_id, |session| session.spans.clone())
            .unwrap_or_default()
    }

    pub fn resolve_ref(&self, session_id: Uuid, ref_id: &str) -> Option<ResolvedRef> {
        self.sessions
            .merge(&session_id, |session| {
                session.refs.get(ref_id).map(|(chunk_id, source)| ResolvedRef {
                    chunk_id: *chunk_id,
                    source: source.clone(),
                })
            })
            .ok()
            .flatten()
    }

    /// Reference ids of a session in assignment order
    pub fn known_refs(&self, session_id: Uuid) -> Vec<String> {
        self.sessions
            .merge(&session_id, |session| session.ref_order.clone())
            .unwrap_or_default()
    }

    /// Drop a session's provenance; returns the number of spans released.
    pub fn release_session(&self, session_id: Uuid) -> usize {
        let released = self
            .sessions
            .remove(&session_id)
            .map_or(0, |session| session.spans.len());
        tracing::debug!(session_id = %session_id, released, "Provenance released");
        released
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn health(&self) -> ComponentHealth {
        ComponentHealth::healthy("provenance_engine")
    }
}

fn validate_timestamps(timestamps: &[SourceTimestamp]) -> Result<()> {
    for (index, ts) in timestamps.iter().enumerate() {
        let reason = if !ts.start_time.is_finite() || !ts.end_time.is_finite() {
            Some("non-finite time")
        } else if ts.start_time < 0.0 || ts.end_time < 0.0 {
            Some("negative time")
        } else if ts.start_time > ts.end_time {
            Some("start after end")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ProvenanceError::InvalidTimestamp { index, reason });
        }
    }
    Ok(())
}
