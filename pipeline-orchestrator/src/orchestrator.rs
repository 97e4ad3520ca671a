use chrono::Utc;
use consent_authority::{
    AuthError, ConsentContext, ConsentFlag, ConsentGrant, Operation, SessionCredential, TokenAuthority,
};
use error_common::{codes, overall_status, ComponentHealth, ErrorCode, HealthStatus};
use logger_redacted::{audit_event, truncate_hash, LogScrubber, ScrubConfig};
use memory_store::KeyedStore;
use phi_redaction::{PhiRedactor, RedactionAudit};
use provenance_engine::{ProvenanceMapper, ProvenanceSpan, SourceTimestamp};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::collaborators::{
    AudioInput, ConsultationRecord, ConsultationStore, SummaryMetadata, SummaryRequest, SummarySegment,
    Summarizer, Transcript, TranscriptionService,
};
use crate::config::PipelineConfig;
use crate::error::{CollaboratorError, PipelineError, Result};
use crate::retry::run_with_retry;
use crate::session::{GroundedStatement, HaltRecord, InFlightGuard, PipelineContext, PipelineStage};

/// External services the orchestrator drives
#[derive(Clone)]
pub struct Collaborators {
    pub transcriber: Arc<dyn TranscriptionService>,
    pub summarizer: Arc<dyn Summarizer>,
    pub store: Arc<dyn ConsultationStore>,
}

/// A transcribed, redacted and mapped chunk
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedChunk {
    pub span: ProvenanceSpan,
    pub audit: RedactionAudit,
    pub transcription_confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutcome {
    pub statements: Vec<GroundedStatement>,
    /// Statements dropped for citing no known reference id
    pub excluded: usize,
    /// Summary generation was not consented
    pub skipped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub stored: bool,
    pub chunk_count: usize,
    pub statement_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineHealth {
    pub status: HealthStatus,
    pub active_sessions: usize,
    pub components: Vec<ComponentHealth>,
}

/// Sequences a consultation session through the privacy pipeline.
///
/// Raw transcript text exists only inside [`process_audio`](Self::process_audio),
/// between the transcription call and the redaction call. Everything
/// handed onwards is `RedactedText`.
pub struct PipelineOrchestrator {
    authority: Arc<TokenAuthority>,
    redactor: Arc<PhiRedactor>,
    mapper: Arc<ProvenanceMapper>,
    collaborators: Collaborators,
    sessions: KeyedStore<Uuid, PipelineContext>,
    scrubber: LogScrubber,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    pub fn new(
        authority: Arc<TokenAuthority>,
        redactor: Arc<PhiRedactor>,
        mapper: Arc<ProvenanceMapper>,
        collaborators: Collaborators,
        config: PipelineConfig,
    ) -> Result<Self> {
        let scrubber =
            LogScrubber::new(ScrubConfig::default()).map_err(|e| PipelineError::Setup(e.to_string()))?;

        Ok(Self {
            authority,
            redactor,
            mapper,
            collaborators,
            sessions: KeyedStore::new(),
            scrubber,
            config,
        })
    }

    pub fn authority(&self) -> &TokenAuthority {
        &self.authority
    }

    pub fn mapper(&self) -> &ProvenanceMapper {
        &self.mapper
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Issue a credential and open its session in `Authenticated`.
    pub fn authenticate(&self, subject_id: &str, consent: ConsentGrant) -> Result<SessionCredential> {
        let credential = self.authority.issue(subject_id, consent)?;
        let hashed_subject_id = self.authority.hash_subject(subject_id);
        let subject_prefix = truncate_hash(&hashed_subject_id).to_string();

        self.sessions.put(
            credential.session_id,
            PipelineContext::new(credential.session_id, hashed_subject_id, consent),
        )?;

        audit_event!(
            "stage_transition",
            session_id = %credential.session_id,
            subject = %subject_prefix,
            from = %PipelineStage::Unauthenticated,
            to = %PipelineStage::Authenticated,
            "Session opened"
        );
        Ok(credential)
    }

    pub fn start_recording(&self, token: &str) -> Result<PipelineStage> {
        let consent = self.verify(token)?;
        let session_id = consent.session_id;
        let (_guard, _) = self.claim(session_id, &[PipelineStage::Authenticated], PipelineStage::Recording)?;
        require(&consent, Operation::RecordAudio)?;

        self.advance(session_id, PipelineStage::Recording, |_| {})?;
        Ok(PipelineStage::Recording)
    }

    /// Transcribe one audio chunk, redact it, and bind it to provenance.
    ///
    /// Accepted while `Recording`, and again while `Redacted` for further
    /// chunks of the same session.
    pub async fn process_audio(&self, token: &str, audio: &AudioInput) -> Result<ProcessedChunk> {
        let consent = self.verify(token)?;
        let session_id = consent.session_id;
        let (_guard, from) = self.claim(
            session_id,
            &[PipelineStage::Recording, PipelineStage::Redacted],
            PipelineStage::Transcribed,
        )?;
        require(&consent, Operation::Transcribe)?;
        require(&consent, Operation::AiProcess)?;

        let transcriber = &self.collaborators.transcriber;
        let transcript = match run_with_retry(
            &self.config.retry,
            self.config.transcription_timeout(),
            "transcription",
            || transcriber.transcribe(audio),
        )
        .await
        {
            Ok(transcript) => transcript,
            Err(error) => return Err(self.stage_failed(session_id, PipelineStage::Transcribed, from, error)),
        };

        let Transcript {
            text: raw,
            confidence: transcription_confidence,
            timestamps,
            metadata,
        } = transcript;
        let windows: Vec<SourceTimestamp> = timestamps
            .iter()
            .map(|record| SourceTimestamp::new(record.start_time, record.end_time))
            .collect();
        drop(timestamps);

        tracing::debug!(
            session_id = %session_id,
            provider = %metadata.provider,
            bytes = raw.len(),
            segments = windows.len(),
            "Transcript received"
        );

        let last_completed = if from == PipelineStage::Recording {
            self.advance(session_id, PipelineStage::Transcribed, |_| {})?;
            PipelineStage::Transcribed
        } else {
            from
        };

        let result = self.redactor.redact(raw.as_str());
        drop(raw);

        let (text, audit) = match result.into_redacted() {
            Ok(parts) => parts,
            Err(error) => {
                tracing::error!(
                    session_id = %session_id,
                    code = error.code(),
                    "Redaction withheld output; halting session"
                );
                self.halt(session_id, last_completed, error.code());
                return Err(PipelineError::RedactionFailure { last_completed });
            }
        };

        let span = match self.mapper.map(text, &windows, session_id) {
            Ok(span) => span,
            Err(error) => {
                tracing::error!(
                    session_id = %session_id,
                    code = error.code(),
                    "Provenance mapping failed; halting session"
                );
                self.halt(session_id, last_completed, error.code());
                return Err(PipelineError::Provenance {
                    last_completed,
                    source: error,
                });
            }
        };

        let chunk_id = span.chunk_id;
        let recorded_audit = audit.clone();
        let language = Some(metadata.language).filter(|language| !language.is_empty());
        self.advance(session_id, PipelineStage::Redacted, move |context| {
            context.chunk_ids.push(chunk_id);
            context.redaction_audits.push(recorded_audit);
            if context.language.is_none() {
                context.language = language;
            }
        })?;

        tracing::info!(
            session_id = %session_id,
            chunk_id = %chunk_id,
            refs = span.source_refs.len(),
            degraded = span.degraded,
            phi_matches = audit.total_matches,
            redaction_confidence = audit.confidence,
            "Chunk processed"
        );

        Ok(ProcessedChunk {
            span,
            audit,
            transcription_confidence,
        })
    }

    /// Summarize the session's redacted chunks, keeping only grounded
    /// statements. Skipped with an empty summary when not consented.
    pub async fn summarize(&self, token: &str) -> Result<SummaryOutcome> {
        let consent = self.verify(token)?;
        let session_id = consent.session_id;
        let (_guard, _) = self.claim(session_id, &[PipelineStage::Redacted], PipelineStage::Summarized)?;

        if !consent.consent.permits(Operation::GenerateSummary) {
            tracing::info!(session_id = %session_id, "Summary generation not consented; skipping");
            self.advance(session_id, PipelineStage::Summarized, |context| {
                context.summary_skipped = true;
                context.statements.clear();
            })?;
            return Ok(SummaryOutcome {
                statements: Vec::new(),
                excluded: 0,
                skipped: true,
            });
        }

        let available_refs = self.mapper.known_refs(session_id);
        let segments: Vec<SummarySegment> = self
            .mapper
            .spans(session_id)
            .into_iter()
            .map(|span| SummarySegment {
                reference_ids: span.ref_ids().into_iter().map(str::to_string).collect(),
                text: span.text,
            })
            .collect();
        let language = self
            .sessions
            .get(&session_id)
            .and_then(|context| context.language);
        let request = SummaryRequest {
            metadata: SummaryMetadata {
                session_id,
                language,
                segment_count: segments.len(),
            },
            segments,
            available_refs,
        };

        let summarizer = &self.collaborators.summarizer;
        let response = match run_with_retry(
            &self.config.retry,
            self.config.summarization_timeout(),
            "summarization",
            || summarizer.summarize(&request),
        )
        .await
        {
            Ok(response) => response,
            Err(error) => {
                return Err(self.stage_failed(
                    session_id,
                    PipelineStage::Summarized,
                    PipelineStage::Redacted,
                    error,
                ))
            }
        };

        let (statements, excluded) = ground_statements(session_id, &request.available_refs, response.statements);
        let kept = statements.clone();
        self.advance(session_id, PipelineStage::Summarized, move |context| {
            context.statements = kept;
        })?;

        tracing::info!(
            session_id = %session_id,
            statements = statements.len(),
            excluded,
            "Summary grounded"
        );
        Ok(SummaryOutcome {
            statements,
            excluded,
            skipped: false,
        })
    }

    /// Finish the session, storing the consultation record when consented.
    pub async fn complete(&self, token: &str) -> Result<CompletionOutcome> {
        let consent = self.verify(token)?;
        let session_id = consent.session_id;
        let (_guard, _) = self.claim(session_id, &[PipelineStage::Summarized], PipelineStage::Completed)?;
        let snapshot = self.sessions.get(&session_id).ok_or(PipelineError::SessionNotFound)?;
        let chunks = self.mapper.spans(session_id);
        let chunk_count = chunks.len();
        let statement_count = snapshot.statements.len();

        let stored = if consent.consent.permits(Operation::StoreData) {
            let record = ConsultationRecord {
                session_id,
                hashed_subject_id: snapshot.hashed_subject_id,
                chunks,
                statements: snapshot.statements,
                redaction_audits: snapshot.redaction_audits,
                completed_at: Utc::now(),
            };
            let store = &self.collaborators.store;
            if let Err(error) = run_with_retry(
                &self.config.retry,
                self.config.storage_timeout(),
                "storage",
                || store.append(session_id, &record),
            )
            .await
            {
                return Err(self.stage_failed(
                    session_id,
                    PipelineStage::Completed,
                    PipelineStage::Summarized,
                    error,
                ));
            }
            true
        } else {
            tracing::info!(session_id = %session_id, "Storage not consented; consultation record not stored");
            false
        };

        self.advance(session_id, PipelineStage::Completed, |context| {
            context.stored = stored;
        })?;

        Ok(CompletionOutcome {
            stored,
            chunk_count,
            statement_count,
        })
    }

    /// Withdraw a consent flag. The session accepts no further operations.
    pub fn revoke_consent(&self, token: &str, consent_type: &str) -> Result<()> {
        let consent = self.verify(token)?;
        let flag: ConsentFlag = consent_type.parse()?;
        let session_id = consent.session_id;

        self.sessions
            .merge(&session_id, |context| {
                context.revoked = true;
                context.touch();
            })
            .map_err(|_| PipelineError::SessionNotFound)?;

        if !self.authority.revoke(token, flag.as_str())? {
            return Err(PipelineError::Auth(AuthError::TokenInvalid(
                "credential failed verification during revocation".into(),
            )));
        }
        Ok(())
    }

    pub fn refresh(&self, token: &str) -> Result<SessionCredential> {
        let consent = self.verify(token)?;
        let context = self
            .sessions
            .get(&consent.session_id)
            .ok_or(PipelineError::SessionNotFound)?;
        if context.revoked {
            return Err(PipelineError::SessionRevoked);
        }
        Ok(self.authority.refresh(token)?)
    }

    /// Snapshot of the session; available in every state.
    pub fn context(&self, token: &str) -> Result<PipelineContext> {
        let consent = self.verify(token)?;
        self.sessions
            .get(&consent.session_id)
            .ok_or(PipelineError::SessionNotFound)
    }

    /// Forget a finished session and release its provenance.
    pub fn close_session(&self, token: &str) -> Result<usize> {
        let consent = self.verify(token)?;
        let session_id = consent.session_id;

        self.sessions
            .merge(&session_id, |context| -> Result<()> {
                if context.in_flight {
                    return Err(PipelineError::SessionBusy);
                }
                if !context.is_terminal() {
                    return Err(PipelineError::SessionActive { stage: context.stage });
                }
                Ok(())
            })
            .map_err(|_| PipelineError::SessionNotFound)??;

        self.sessions.remove(&session_id);
        let released = self.mapper.release_session(session_id);
        audit_event!(
            "session_closed",
            session_id = %session_id,
            released_spans = released,
            "Session closed"
        );
        Ok(released)
    }

    pub async fn health(&self) -> PipelineHealth {
        let components = vec![
            self.redactor.health(),
            self.mapper.health(),
            self.collaborators.transcriber.health().await,
            self.collaborators.summarizer.health().await,
            self.collaborators.store.health().await,
        ];

        PipelineHealth {
            status: overall_status(&components),
            active_sessions: self.sessions.len(),
            components,
        }
    }

    fn verify(&self, token: &str) -> Result<ConsentContext> {
        Ok(self.authority.verify(token)?)
    }

    /// Take the session's in-flight claim if it may move to `to`.
    fn claim(
        &self,
        session_id: Uuid,
        expected: &[PipelineStage],
        to: PipelineStage,
    ) -> Result<(InFlightGuard, PipelineStage)> {
        let from = self
            .sessions
            .merge(&session_id, |context| -> Result<PipelineStage> {
                if context.revoked {
                    return Err(PipelineError::SessionRevoked);
                }
                if let Some(halt) = &context.halted {
                    return Err(PipelineError::SessionHalted {
                        last_completed: halt.last_completed,
                    });
                }
                if context.in_flight {
                    return Err(PipelineError::SessionBusy);
                }
                if !expected.contains(&context.stage) {
                    return Err(PipelineError::InvalidTransition {
                        from: context.stage,
                        to,
                    });
                }
                context.in_flight = true;
                Ok(context.stage)
            })
            .map_err(|_| PipelineError::SessionNotFound)??;

        Ok((InFlightGuard::new(self.sessions.clone(), session_id), from))
    }

    /// Commit a stage, unless consent was revoked while the operation ran.
    fn advance<F>(&self, session_id: Uuid, to: PipelineStage, update: F) -> Result<()>
    where
        F: FnOnce(&mut PipelineContext),
    {
        let from = self
            .sessions
            .merge(&session_id, |context| -> Result<PipelineStage> {
                if context.revoked {
                    return Err(PipelineError::SessionRevoked);
                }
                let from = context.stage;
                update(context);
                context.stage = to;
                context.touch();
                Ok(from)
            })
            .map_err(|_| PipelineError::SessionNotFound)??;

        if from != to {
            audit_event!(
                "stage_transition",
                session_id = %session_id,
                from = %from,
                to = %to,
                "Session stage advanced"
            );
        }
        Ok(())
    }

    fn halt(&self, session_id: Uuid, last_completed: PipelineStage, error_code: &'static str) {
        let halted = self.sessions.merge(&session_id, |context| {
            if context.halted.is_none() {
                context.halted = Some(HaltRecord {
                    last_completed,
                    error_code,
                    halted_at: Utc::now(),
                });
                context.touch();
            }
        });

        if halted.is_ok() {
            audit_event!(
                "session_halted",
                session_id = %session_id,
                last_completed = %last_completed,
                code = error_code,
                "Session halted"
            );
        }
    }

    fn stage_failed(
        &self,
        session_id: Uuid,
        stage: PipelineStage,
        last_completed: PipelineStage,
        error: CollaboratorError,
    ) -> PipelineError {
        let source = self.scrub(error);
        tracing::error!(
            session_id = %session_id,
            stage = %stage,
            error = %source,
            "External stage failed; halting session"
        );
        self.halt(session_id, last_completed, codes::pipeline::EXTERNAL_STAGE_FAILED);
        PipelineError::StageFailed {
            stage,
            last_completed,
            source,
        }
    }

    /// Third parties may echo input back in their error messages
    fn scrub(&self, error: CollaboratorError) -> CollaboratorError {
        match error {
            CollaboratorError::Unavailable(message) => {
                CollaboratorError::Unavailable(self.scrub_message(&message))
            }
            CollaboratorError::Rejected(message) => CollaboratorError::Rejected(self.scrub_message(&message)),
            timeout @ CollaboratorError::Timeout { .. } => timeout,
        }
    }

    /// Full PHI redaction first, then the log scrubber for network and card
    /// identifiers. A withheld redaction leaves only the withheld marker.
    fn scrub_message(&self, message: &str) -> String {
        let redacted = self.redactor.redact(message);
        self.scrubber.scrub(redacted.redacted_text())
    }
}

fn require(consent: &ConsentContext, operation: Operation) -> Result<()> {
    if consent.consent.permits(operation) {
        Ok(())
    } else {
        tracing::warn!(
            session_id = %consent.session_id,
            operation = %operation,
            "Operation not permitted by consent"
        );
        Err(PipelineError::ConsentDenied { operation })
    }
}

/// Keep statements citing at least one known reference id; unknown ids are
/// dropped from kept statements.
fn ground_statements(
    session_id: Uuid,
    available_refs: &[String],
    statements: Vec<crate::collaborators::SummaryStatement>,
) -> (Vec<GroundedStatement>, usize) {
    let known: HashSet<&str> = available_refs.iter().map(String::as_str).collect();
    let mut grounded = Vec::with_capacity(statements.len());
    let mut excluded = 0usize;

    for (index, statement) in statements.into_iter().enumerate() {
        let cited: Vec<String> = statement
            .reference_ids
            .iter()
            .filter(|id| known.contains(id.as_str()))
            .cloned()
            .collect();

        if cited.is_empty() {
            excluded = excluded.saturating_add(1);
            tracing::warn!(
                session_id = %session_id,
                statement_index = index,
                cited_ids = statement.reference_ids.len(),
                "Summary statement cites no known reference id; excluded"
            );
            continue;
        }
        if cited.len() < statement.reference_ids.len() {
            tracing::warn!(
                session_id = %session_id,
                statement_index = index,
                unknown_ids = statement.reference_ids.len().saturating_sub(cited.len()),
                "Unknown reference ids dropped from summary statement"
            );
        }

        grounded.push(GroundedStatement {
            text: statement.text,
            reference_ids: cited,
        });
    }

    (grounded, excluded)
}
