mod common;

use common::{audio, offline_orchestrator, orchestrator_with, default_redactor, VISIT_NOTE};
use consent_authority::ConsentGrant;
use pipeline_orchestrator::{
    CollaboratorError, InMemoryConsultationStore, LoopbackTranscriber, PipelineError, PipelineStage,
    SummaryRequest, SummaryResponse, SummaryStatement, Summarizer,
};
use async_trait::async_trait;
use mockall::mock;
use std::sync::Arc;

mock! {
    pub SummaryService {}

    #[async_trait]
    impl Summarizer for SummaryService {
        async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse, CollaboratorError>;
    }
}

#[tokio::test]
async fn full_session_never_lets_phi_past_redaction() {
    let (orchestrator, store) = offline_orchestrator();
    let credential = orchestrator.authenticate("patient-0042", ConsentGrant::full()).unwrap();
    let token = credential.token.as_str();

    assert_eq!(orchestrator.start_recording(token).unwrap(), PipelineStage::Recording);

    let chunk = orchestrator.process_audio(token, &audio(VISIT_NOTE)).await.unwrap();
    assert!(!chunk.span.text.as_str().contains("123-45-6789"));
    assert!(chunk.span.text.as_str().contains("[SSN_REDACTED]"));
    assert_eq!(chunk.span.ref_ids(), vec!["S1", "S2"]);
    assert_eq!(chunk.audit.total_matches, 1);

    let summary = orchestrator.summarize(token).await.unwrap();
    assert!(!summary.skipped);
    assert_eq!(summary.excluded, 0);
    assert_eq!(summary.statements.len(), 1);
    assert_eq!(summary.statements.first().unwrap().reference_ids, vec!["S1".to_string()]);

    let completion = orchestrator.complete(token).await.unwrap();
    assert!(completion.stored);
    assert_eq!(completion.chunk_count, 1);

    let stored = store.get(credential.session_id).unwrap();
    assert_eq!(stored.records.len(), 1);
    let json = serde_json::to_string(&stored.records).unwrap();
    assert!(!json.contains("123-45-6789"));
    assert!(!json.contains("patient-0042"));

    let context = orchestrator.context(token).unwrap();
    assert_eq!(context.stage, PipelineStage::Completed);
    assert!(context.stored);
    assert!(!context.is_in_flight());

    assert_eq!(orchestrator.close_session(token).unwrap(), 1);
    assert!(matches!(orchestrator.context(token), Err(PipelineError::SessionNotFound)));
}

#[tokio::test]
async fn further_chunks_continue_reference_numbering() {
    let (orchestrator, _) = offline_orchestrator();
    let credential = orchestrator.authenticate("patient-0042", ConsentGrant::full()).unwrap();
    let token = credential.token.as_str();
    orchestrator.start_recording(token).unwrap();

    orchestrator.process_audio(token, &audio(VISIT_NOTE)).await.unwrap();
    let second = orchestrator
        .process_audio(token, &audio("Sleeps poorly. Drinks coffee."))
        .await
        .unwrap();

    assert_eq!(second.span.ref_ids(), vec!["S3", "S4"]);
    let context = orchestrator.context(token).unwrap();
    assert_eq!(context.stage, PipelineStage::Redacted);
    assert_eq!(context.chunk_ids.len(), 2);
    assert_eq!(context.redaction_audits.len(), 2);
    assert_eq!(context.language.as_deref(), Some("en-US"));
}

#[tokio::test]
async fn minimum_consent_skips_summary_and_storage() {
    let (orchestrator, store) = offline_orchestrator();
    let credential = orchestrator.authenticate("patient-0042", ConsentGrant::minimum()).unwrap();
    let token = credential.token.as_str();

    orchestrator.start_recording(token).unwrap();
    orchestrator.process_audio(token, &audio(VISIT_NOTE)).await.unwrap();

    let summary = orchestrator.summarize(token).await.unwrap();
    assert!(summary.skipped);
    assert!(summary.statements.is_empty());

    let completion = orchestrator.complete(token).await.unwrap();
    assert!(!completion.stored);
    assert_eq!(store.session_count(), 0);
    assert!(orchestrator.context(token).unwrap().summary_skipped);
}

#[tokio::test]
async fn statements_without_known_references_are_excluded() {
    let mut summarizer = MockSummaryService::new();
    summarizer.expect_summarize().times(1).returning(|request| {
        assert_eq!(request.available_refs, vec!["S1".to_string(), "S2".to_string()]);
        assert_eq!(request.metadata.language.as_deref(), Some("en-US"));
        assert_eq!(request.metadata.segment_count, 1);
        Ok(SummaryResponse {
            statements: vec![
                SummaryStatement {
                    text: "Headache rated 7/10.".into(),
                    reference_ids: vec!["S1".into()],
                },
                SummaryStatement {
                    text: "Uncited claim.".into(),
                    reference_ids: Vec::new(),
                },
                SummaryStatement {
                    text: "Cites a chunk that does not exist.".into(),
                    reference_ids: vec!["S40".into()],
                },
            ],
        })
    });

    let orchestrator = orchestrator_with(
        Arc::new(LoopbackTranscriber::default()),
        Arc::new(summarizer),
        Arc::new(InMemoryConsultationStore::new()),
        default_redactor(),
    );
    let credential = orchestrator.authenticate("patient-0042", ConsentGrant::full()).unwrap();
    let token = credential.token.as_str();
    orchestrator.start_recording(token).unwrap();
    orchestrator.process_audio(token, &audio(VISIT_NOTE)).await.unwrap();

    let summary = orchestrator.summarize(token).await.unwrap();
    assert_eq!(summary.excluded, 2);
    assert_eq!(summary.statements.len(), 1);
    assert_eq!(summary.statements.first().unwrap().text, "Headache rated 7/10.");
}

#[tokio::test]
async fn stages_cannot_be_skipped() {
    let (orchestrator, _) = offline_orchestrator();
    let credential = orchestrator.authenticate("patient-0042", ConsentGrant::full()).unwrap();
    let token = credential.token.as_str();

    let error = orchestrator.summarize(token).await.unwrap_err();
    assert!(matches!(
        error,
        PipelineError::InvalidTransition {
            from: PipelineStage::Authenticated,
            to: PipelineStage::Summarized,
        }
    ));
    assert!(matches!(
        orchestrator.process_audio(token, &audio(VISIT_NOTE)).await,
        Err(PipelineError::InvalidTransition { .. })
    ));

    orchestrator.start_recording(token).unwrap();
    assert!(matches!(
        orchestrator.start_recording(token),
        Err(PipelineError::InvalidTransition { .. })
    ));
    assert!(matches!(
        orchestrator.close_session(token),
        Err(PipelineError::SessionActive {
            stage: PipelineStage::Recording
        })
    ));
}

#[tokio::test]
async fn revoked_session_rejects_every_later_operation() {
    let (orchestrator, _) = offline_orchestrator();
    let credential = orchestrator.authenticate("patient-0042", ConsentGrant::full()).unwrap();
    let token = credential.token.as_str();
    orchestrator.start_recording(token).unwrap();
    orchestrator.process_audio(token, &audio(VISIT_NOTE)).await.unwrap();

    orchestrator.revoke_consent(token, "storage").unwrap();

    assert!(matches!(orchestrator.start_recording(token), Err(PipelineError::SessionRevoked)));
    assert!(matches!(
        orchestrator.process_audio(token, &audio(VISIT_NOTE)).await,
        Err(PipelineError::SessionRevoked)
    ));
    assert!(matches!(orchestrator.summarize(token).await, Err(PipelineError::SessionRevoked)));
    assert!(matches!(orchestrator.complete(token).await, Err(PipelineError::SessionRevoked)));
    assert!(matches!(orchestrator.refresh(token), Err(PipelineError::SessionRevoked)));

    let context = orchestrator.context(token).unwrap();
    assert!(context.revoked);
    assert!(context.is_terminal());
    assert_eq!(orchestrator.close_session(token).unwrap(), 1);
}

#[tokio::test]
async fn unknown_consent_flag_is_rejected() {
    let (orchestrator, _) = offline_orchestrator();
    let credential = orchestrator.authenticate("patient-0042", ConsentGrant::full()).unwrap();

    let error = orchestrator.revoke_consent(&credential.token, "telepathy").unwrap_err();
    assert!(matches!(error, PipelineError::Auth(_)));
    assert!(!orchestrator.context(&credential.token).unwrap().revoked);
}

#[tokio::test]
async fn tampered_credentials_are_rejected() {
    let (orchestrator, _) = offline_orchestrator();
    let credential = orchestrator.authenticate("patient-0042", ConsentGrant::full()).unwrap();
    let tampered = format!("{}x", credential.token);

    let error = orchestrator.start_recording(&tampered).unwrap_err();
    assert!(matches!(error, PipelineError::Auth(_)));
    assert_eq!(error.user_message(), "Authentication failed; please sign in again");
}

#[test]
fn insufficient_consent_never_opens_a_session() {
    let (orchestrator, _) = offline_orchestrator();
    let consent = ConsentGrant::full().with(consent_authority::ConsentFlag::AiProcessing, false);

    let error = orchestrator.authenticate("patient-0042", consent).unwrap_err();
    assert!(matches!(error, PipelineError::Auth(_)));
    assert_eq!(orchestrator.session_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sessions_do_not_interfere() {
    let (orchestrator, store) = offline_orchestrator();
    let orchestrator = Arc::new(orchestrator);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move {
                let subject = format!("patient-{i:04}");
                let credential = orchestrator.authenticate(&subject, ConsentGrant::full()).unwrap();
                let token = credential.token.as_str();
                orchestrator.start_recording(token).unwrap();
                let chunk = orchestrator.process_audio(token, &audio(VISIT_NOTE)).await.unwrap();
                orchestrator.summarize(token).await.unwrap();
                orchestrator.complete(token).await.unwrap();
                (credential.session_id, chunk.span.ref_ids().join(","))
            })
        })
        .collect();

    for handle in handles {
        let (session_id, refs) = handle.await.unwrap();
        assert_eq!(refs, "S1,S2");
        assert_eq!(store.get(session_id).unwrap().records.len(), 1);
    }
    assert_eq!(store.session_count(), 8);
    assert_eq!(orchestrator.session_count(), 8);
}

#[tokio::test]
async fn health_reports_every_component() {
    let (orchestrator, _) = offline_orchestrator();
    let health = orchestrator.health().await;

    assert_eq!(health.components.len(), 5);
    assert!(health.components.iter().all(|component| component.is_healthy()));
    assert_eq!(health.active_sessions, 0);
}
