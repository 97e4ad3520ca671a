use phi_redaction::{
    default_detectors, DetectionMethod, DetectorError, PhiDetector, PhiRedactor, PhiType,
    RedactionConfig, RedactionError, WITHHELD_MARKER,
};
use std::ops::Range;

struct ErroringDetector;

impl PhiDetector for ErroringDetector {
    fn name(&self) -> &'static str {
        "erroring"
    }
    fn phi_type(&self) -> PhiType {
        PhiType::Name
    }
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Heuristic
    }
    fn detect(&self, _text: &str) -> Result<Vec<Range<usize>>, DetectorError> {
        Err(DetectorError::new("erroring", "model unavailable"))
    }
}

struct PanickingDetector;

impl PhiDetector for PanickingDetector {
    fn name(&self) -> &'static str {
        "panicking"
    }
    fn phi_type(&self) -> PhiType {
        PhiType::Name
    }
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Heuristic
    }
    fn detect(&self, _text: &str) -> Result<Vec<Range<usize>>, DetectorError> {
        panic!("detector bug")
    }
}

fn redactor_with(extra: Box<dyn PhiDetector>) -> PhiRedactor {
    let mut detectors = default_detectors().unwrap();
    detectors.push(extra);
    PhiRedactor::with_detectors(RedactionConfig::default(), detectors)
}

const PHI_TEXT: &str = "SSN 123-45-6789, call 555-867-5309";

#[test]
fn detector_error_withholds_everything() {
    let result = redactor_with(Box::new(ErroringDetector)).redact(PHI_TEXT);

    assert!(result.is_withheld());
    assert_eq!(result.redacted_text(), WITHHELD_MARKER);
    assert!(result.matches().is_empty());
    assert!(result.confidence() >= 0.0 && result.confidence() <= 1.0);
    assert!(matches!(
        result.into_redacted(),
        Err(RedactionError::RedactionFailure { .. })
    ));
}

#[test]
fn detector_panic_withholds_everything() {
    let result = redactor_with(Box::new(PanickingDetector)).redact(PHI_TEXT);

    assert!(result.is_withheld());
    assert_eq!(result.redacted_text(), WITHHELD_MARKER);
    assert!(result.matches().is_empty());
    assert!(!result.redacted_text().contains("123-45-6789"));
}

#[test]
fn failure_user_message_is_generic() {
    let error = redactor_with(Box::new(ErroringDetector))
        .redact(PHI_TEXT)
        .into_redacted()
        .unwrap_err();
    assert_eq!(error.user_message(), "Processing unavailable");
}

#[test]
fn withheld_audit_serializes_without_text() {
    let result = redactor_with(Box::new(ErroringDetector)).redact(PHI_TEXT);
    let json = serde_json::to_string(result.audit()).unwrap();
    assert!(json.contains("\"withheld\":true"));
    assert!(!json.contains("123-45-6789"));
}
