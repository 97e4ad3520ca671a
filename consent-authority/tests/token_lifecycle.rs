use chrono::Duration;
use consent_authority::{
    AuthError, AuthorityConfig, ConsentFlag, ConsentGrant, ManualClock, TokenAuthority,
};
use proptest::prelude::*;
use std::sync::Arc;

fn authority_with_clock() -> (TokenAuthority, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let authority =
        TokenAuthority::with_clock(AuthorityConfig::default(), Arc::clone(&clock) as Arc<dyn consent_authority::Clock>).unwrap();
    (authority, clock)
}

#[test]
fn verify_returns_the_issued_consent_and_a_hashed_subject() {
    let (authority, _) = authority_with_clock();
    let consent = ConsentGrant::minimum().with(ConsentFlag::SummaryGeneration, true);

    let credential = authority.issue("patient-0042", consent).unwrap();
    let context = authority.verify(&credential.token).unwrap();

    assert_eq!(context.consent, consent);
    assert_eq!(context.session_id, credential.session_id);
    assert_ne!(context.hashed_subject_id, "patient-0042");
    assert!(!context.hashed_subject_id.contains("patient-0042"));
    assert!(authority.subject_matches(&context, "patient-0042"));
    assert!(!authority.subject_matches(&context, "patient-0043"));
}

#[test]
fn minimum_consent_scenario() {
    let (authority, _) = authority_with_clock();
    let consent = ConsentGrant {
        recording: true,
        transcription: true,
        ai_processing: true,
        storage: false,
        summary_generation: false,
    };

    let credential = authority.issue("patient-7", consent).unwrap();
    let context = authority.verify(&credential.token).unwrap();

    assert!(authority.has_required_consent(&context));
    assert!(!authority.check_operation_consent(&context, "store_data").unwrap());
    assert!(authority.check_operation_consent(&context, "record_audio").unwrap());
    assert!(matches!(
        authority.check_operation_consent(&context, "export_everything"),
        Err(AuthError::UnknownOperation(_))
    ));
}

#[test]
fn expiry_boundaries_follow_ttl_and_leeway() {
    let (authority, clock) = authority_with_clock();
    let credential = authority.issue("patient-1", ConsentGrant::minimum()).unwrap();

    clock.advance(Duration::seconds(3600 - 1));
    assert!(authority.verify(&credential.token).is_ok());

    // Inside the leeway window
    clock.advance(Duration::seconds(30));
    assert!(authority.verify(&credential.token).is_ok());

    clock.advance(Duration::seconds(2));
    assert!(matches!(
        authority.verify(&credential.token),
        Err(AuthError::TokenExpired)
    ));
}

#[test]
fn refresh_is_only_allowed_near_expiry() {
    let (authority, clock) = authority_with_clock();
    let consent = ConsentGrant::full();
    let credential = authority.issue("patient-1", consent).unwrap();

    assert!(matches!(
        authority.refresh(&credential.token),
        Err(AuthError::RefreshNotNeeded { .. })
    ));

    clock.advance(Duration::seconds(3600 - 200));
    let refreshed = authority.refresh(&credential.token).unwrap();
    assert_ne!(refreshed.token, credential.token);
    assert_eq!(refreshed.session_id, credential.session_id);
    assert!(refreshed.expires_at > credential.expires_at);

    let old = authority.verify(&credential.token).unwrap();
    let new = authority.verify(&refreshed.token).unwrap();
    assert_eq!(new.consent, old.consent);
    assert_eq!(new.hashed_subject_id, old.hashed_subject_id);
    assert_ne!(new.token_id, old.token_id);
}

#[test]
fn expired_credentials_cannot_be_refreshed() {
    let (authority, clock) = authority_with_clock();
    let credential = authority.issue("patient-1", ConsentGrant::minimum()).unwrap();
    clock.advance(Duration::seconds(3600 + 31));
    assert!(matches!(
        authority.refresh(&credential.token),
        Err(AuthError::TokenExpired)
    ));
}

#[test]
fn revoke_verifies_and_parses_the_flag() {
    let (authority, clock) = authority_with_clock();
    let credential = authority.issue("patient-1", ConsentGrant::minimum()).unwrap();

    assert!(authority.revoke(&credential.token, "recording").unwrap());
    assert!(authority.revoke(&credential.token, "aiProcessing").unwrap());
    assert!(matches!(
        authority.revoke(&credential.token, "marketing"),
        Err(AuthError::UnknownConsentKey(_))
    ));

    clock.advance(Duration::hours(3));
    assert!(!authority.revoke(&credential.token, "recording").unwrap());
    assert!(!authority.revoke("garbage", "recording").unwrap());
}

#[test]
fn audit_info_exposes_only_a_prefix() {
    let (authority, clock) = authority_with_clock();
    let credential = authority.issue("patient-1", ConsentGrant::minimum()).unwrap();
    let context = authority.verify(&credential.token).unwrap();

    let info = authority.audit_info(&credential.token).unwrap();
    assert_eq!(info.subject_prefix.len(), 8);
    assert!(context.hashed_subject_id.starts_with(&info.subject_prefix));
    assert_eq!(info.granted_flags, 3);
    assert!(!info.expired);

    clock.advance(Duration::hours(2));
    assert!(authority.audit_info(&credential.token).unwrap().expired);
}

#[test]
fn empty_subject_is_rejected() {
    let (authority, _) = authority_with_clock();
    assert!(matches!(
        authority.issue("  ", ConsentGrant::full()),
        Err(AuthError::InvalidSubject)
    ));
}

fn any_grant() -> impl Strategy<Value = ConsentGrant> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(recording, transcription, ai_processing, storage, summary_generation)| ConsentGrant {
            recording,
            transcription,
            ai_processing,
            storage,
            summary_generation,
        },
    )
}

proptest! {
    #[test]
    fn issue_requires_exactly_the_minimum_flags(grant in any_grant(), subject in "[a-z0-9-]{1,24}") {
        let authority = TokenAuthority::new(AuthorityConfig::default()).unwrap();
        let result = authority.issue(&subject, grant);

        if grant.recording && grant.transcription && grant.ai_processing {
            let credential = result.unwrap();
            let context = authority.verify(&credential.token).unwrap();
            prop_assert_eq!(context.consent, grant);
            prop_assert_ne!(context.hashed_subject_id, subject);
        } else {
            let is_insufficient = matches!(result, Err(AuthError::ConsentInsufficient { .. }));
            prop_assert!(is_insufficient);
        }
    }
}
