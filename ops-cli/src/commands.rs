use anyhow::Context;
use config_engine::NightingaleConfig;
use consent_authority::{ConsentFlag, ConsentGrant, TokenAuthority};
use error_common::{codes, NightingaleError, Result};
use logger_redacted::truncate_hash;
use phi_redaction::PhiRedactor;
use pipeline_orchestrator::{
    AudioInput, Collaborators, ExtractiveSummarizer, InMemoryConsultationStore, LoopbackTranscriber,
    PipelineOrchestrator,
};
use provenance_engine::ProvenanceMapper;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use crate::cli::Command;

/// Spoken consultation used by `demo` when no transcript file is given
pub const DEMO_TRANSCRIPT: &str = "Patient John Smith, DOB 03/14/1962, MRN 00482913, reports chest tightness since Monday. \
He lives at 42 Oak Street and can be reached at 555-201-7788. \
Symptoms ease with rest and there is no shortness of breath.";

/// Execute one command and return its JSON output.
///
/// The configuration is validated first; `input` is only read by `redact`.
pub async fn run(command: Command, config: NightingaleConfig, input: impl Read) -> Result<Value> {
    config.validate()?;

    match command {
        Command::Issue { subject, consent } => issue(config, &subject, &consent),
        Command::Verify { token } => verify(config, &token),
        Command::AuditInfo { token } => audit_info(config, &token),
        Command::Redact { validate } => redact(&config, input, validate),
        Command::ValidateConfig => Ok(json!({
            "valid": true,
            "config": config.summary(),
        })),
        Command::Demo {
            transcript,
            without_summary,
            without_storage,
        } => {
            let text = match transcript {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading transcript {}", path.display()))?,
                None => DEMO_TRANSCRIPT.to_string(),
            };
            let consent = ConsentGrant::full()
                .with(ConsentFlag::SummaryGeneration, !without_summary)
                .with(ConsentFlag::Storage, !without_storage);
            demo(config, &text, consent).await
        }
    }
}

fn issue(config: NightingaleConfig, subject: &str, consent: &str) -> Result<Value> {
    let flags: HashMap<String, bool> =
        serde_json::from_str(consent).context("consent must be a JSON object of boolean flags")?;
    let grant = ConsentGrant::from_flags(&flags)?;

    let authority = TokenAuthority::new(config.authority)?;
    let credential = authority.issue(subject, grant)?;
    Ok(json!(credential))
}

fn verify(config: NightingaleConfig, token: &str) -> Result<Value> {
    let authority = TokenAuthority::new(config.authority)?;
    let context = authority.verify(token)?;

    Ok(json!({
        "session_id": context.session_id,
        "subject_prefix": truncate_hash(&context.hashed_subject_id),
        "consent": context.consent,
        "has_required_consent": authority.has_required_consent(&context),
        "issued_at": context.issued_at,
        "expires_at": context.expires_at,
        "remaining_secs": context.remaining_secs(authority.now()),
    }))
}

fn audit_info(config: NightingaleConfig, token: &str) -> Result<Value> {
    let authority = TokenAuthority::new(config.authority)?;
    Ok(json!(authority.audit_info(token)?))
}

fn redact(config: &NightingaleConfig, mut input: impl Read, validate: bool) -> Result<Value> {
    let mut text = String::new();
    input.read_to_string(&mut text).context("reading text from stdin")?;

    let redactor = PhiRedactor::new(config.redaction.clone())?;
    let (redacted, audit) = redactor.redact(&text).into_redacted()?;

    if validate && !redactor.validate(&text, redacted.as_str()) {
        return Err(NightingaleError::Redaction {
            code: codes::redaction::REDACTION_FAILURE,
            message: "Redacted output failed validation".into(),
        });
    }

    Ok(json!({
        "redacted_text": redacted,
        "audit": audit,
    }))
}

async fn demo(config: NightingaleConfig, transcript: &str, consent: ConsentGrant) -> Result<Value> {
    let store = Arc::new(InMemoryConsultationStore::new());
    let orchestrator = PipelineOrchestrator::new(
        Arc::new(TokenAuthority::new(config.authority)?),
        Arc::new(PhiRedactor::new(config.redaction)?),
        Arc::new(ProvenanceMapper::new(config.provenance)),
        Collaborators {
            transcriber: Arc::new(LoopbackTranscriber::default()),
            summarizer: Arc::new(ExtractiveSummarizer),
            store: store.clone(),
        },
        config.pipeline,
    )?;

    let credential = orchestrator.authenticate("demo-patient", consent)?;
    let token = credential.token.as_str();
    orchestrator.start_recording(token)?;

    let audio = AudioInput::new(transcript.as_bytes().to_vec(), 16_000, "text/plain");
    let chunk = orchestrator.process_audio(token, &audio).await?;
    let summary = orchestrator.summarize(token).await?;
    let completion = orchestrator.complete(token).await?;
    let context = orchestrator.context(token)?;
    let stored_records = store
        .get(credential.session_id)
        .map_or(0, |stored| stored.records.len());
    let health = orchestrator.health().await;
    orchestrator.close_session(token)?;

    tracing::info!(
        session_id = %credential.session_id,
        stored = completion.stored,
        "Demo session finished"
    );

    Ok(json!({
        "session_id": credential.session_id,
        "stage": context.stage,
        "chunk": chunk,
        "summary": summary,
        "completion": completion,
        "stored_records": stored_records,
        "health": health,
    }))
}
