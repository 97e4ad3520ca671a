#![allow(dead_code)]

use consent_authority::{AuthorityConfig, TokenAuthority};
use phi_redaction::{PhiRedactor, RedactionConfig};
use pipeline_orchestrator::{
    AudioInput, Collaborators, ConsultationStore, ExtractiveSummarizer, InMemoryConsultationStore,
    LoopbackTranscriber, PipelineConfig, PipelineOrchestrator, Summarizer, TranscriptionService,
};
use provenance_engine::{ProvenanceConfig, ProvenanceMapper};
use std::sync::Arc;

pub const VISIT_NOTE: &str =
    "SSN 123-45-6789, patient reports headache 7/10. Pain started two days ago.";

pub fn audio(text: &str) -> AudioInput {
    AudioInput::new(text.as_bytes().to_vec(), 16_000, "text")
}

pub fn orchestrator_with(
    transcriber: Arc<dyn TranscriptionService>,
    summarizer: Arc<dyn Summarizer>,
    store: Arc<dyn ConsultationStore>,
    redactor: PhiRedactor,
) -> PipelineOrchestrator {
    PipelineOrchestrator::new(
        Arc::new(TokenAuthority::new(AuthorityConfig::default()).unwrap()),
        Arc::new(redactor),
        Arc::new(ProvenanceMapper::new(ProvenanceConfig::default())),
        Collaborators {
            transcriber,
            summarizer,
            store,
        },
        PipelineConfig::default(),
    )
    .unwrap()
}

pub fn default_redactor() -> PhiRedactor {
    PhiRedactor::new(RedactionConfig::default()).unwrap()
}

pub fn offline_orchestrator() -> (PipelineOrchestrator, Arc<InMemoryConsultationStore>) {
    let store = Arc::new(InMemoryConsultationStore::new());
    let orchestrator = orchestrator_with(
        Arc::new(LoopbackTranscriber::default()),
        Arc::new(ExtractiveSummarizer),
        store.clone(),
        default_redactor(),
    );
    (orchestrator, store)
}
