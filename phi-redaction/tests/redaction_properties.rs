use phi_redaction::{PhiRedactor, PhiType, RedactionConfig};
use proptest::prelude::*;

fn redactor() -> PhiRedactor {
    PhiRedactor::new(RedactionConfig::default()).unwrap()
}

#[test]
fn ssn_scenario() {
    let result = redactor().redact("SSN 123-45-6789, patient reports headache 7/10");

    assert_eq!(
        result.redacted_text(),
        "[SSN_REDACTED], patient reports headache 7/10"
    );
    assert_eq!(result.matches().len(), 1);
    assert_eq!(result.matches()[0].phi_type, PhiType::Ssn);
    assert_eq!(result.matches()[0].detector, "ssn");
}

#[test]
fn no_phi_means_full_confidence() {
    let result = redactor().redact("patient reports mild headache, no fever");
    assert!(result.matches().is_empty());
    assert_eq!(result.confidence(), 1.0);
    assert_eq!(result.redacted_text(), "patient reports mild headache, no fever");
}

#[test]
fn mixed_fixture_is_fully_redacted() {
    let original = "Patient Maria Lopez, DOB: 03/14/1962, MRN: 00482913. \
                    Lives at 1420 North Maple Avenue. Phone (555) 123-4567, \
                    email maria.lopez@example.com. Seen by Dr. Chen today.";
    let redactor = redactor();
    let result = redactor.redact(original);

    for leaked in [
        "Maria Lopez",
        "03/14/1962",
        "00482913",
        "1420 North Maple",
        "123-4567",
        "maria.lopez@example.com",
        "Chen",
    ] {
        assert!(
            !result.redacted_text().contains(leaked),
            "{leaked} survived: {}",
            result.redacted_text()
        );
    }
    for label in ["DOB:", "MRN:"] {
        assert!(!result.redacted_text().contains(label));
    }

    let types: Vec<PhiType> = result.matches().iter().map(|m| m.phi_type).collect();
    assert_eq!(
        types,
        vec![
            PhiType::Name,
            PhiType::DateOfBirth,
            PhiType::Mrn,
            PhiType::Address,
            PhiType::Phone,
            PhiType::Email,
            PhiType::Name
        ]
    );
    assert!(redactor.validate(original, result.redacted_text()));
}

#[test]
fn matches_are_reported_in_text_order() {
    let result = redactor().redact("jane@example.org then 123-45-6789");
    let starts: Vec<usize> = result.matches().iter().map(|m| m.span.start).collect();
    let mut sorted = starts.clone();
    sorted.sort_unstable();
    assert_eq!(starts, sorted);
    assert_eq!(result.matches()[0].phi_type, PhiType::Email);
}

#[test]
fn validate_rejects_unredacted_text() {
    let redactor = redactor();
    let original = "reach me at jane@example.org";
    assert!(!redactor.validate(original, original));
}

proptest! {
    #[test]
    fn generated_ssns_never_survive(
        area in 100u32..900,
        group in 10u32..100,
        serial in 1000u32..10000,
        prefix in "[a-z ]{0,20}",
        suffix in "[a-z ]{0,20}",
    ) {
        let ssn = format!("{area:03}-{group:02}-{serial:04}");
        let text = format!("{prefix} {ssn} {suffix}");
        let redactor = redactor();
        let result = redactor.redact(&text);

        prop_assert!(!result.redacted_text().contains(&ssn));
        prop_assert!(redactor.validate(&text, result.redacted_text()));
    }

    #[test]
    fn generated_emails_never_survive(
        local in "[a-z][a-z0-9.]{0,12}[a-z0-9]",
        domain in "[a-z]{2,10}",
        tld in "(com|org|net|health)",
    ) {
        let email = format!("{local}@{domain}.{tld}");
        let text = format!("contact {email} after discharge");
        let result = redactor().redact(&text);

        prop_assert!(!result.redacted_text().contains(&email));
        prop_assert!(result.redacted_text().contains("[EMAIL_REDACTED]"));
    }

    #[test]
    fn confidence_is_always_bounded(text in "\\PC{0,200}") {
        let result = redactor().redact(&text);
        prop_assert!((0.0..=1.0).contains(&result.confidence()));
        if result.matches().is_empty() && !result.is_withheld() {
            prop_assert_eq!(result.confidence(), 1.0);
        }
    }
}
