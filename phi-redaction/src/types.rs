use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use zeroize::Zeroizing;

use crate::error::RedactionError;

/// Marker returned in place of text whenever redaction fails closed
pub const WITHHELD_MARKER: &str = "[PROCESSING_WITHHELD]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhiType {
    Ssn,
    Mrn,
    Email,
    DateOfBirth,
    Phone,
    Address,
    Name,
}

impl PhiType {
    /// Canonical placeholder; one per type, not per instance
    pub fn placeholder(&self) -> &'static str {
        match self {
            PhiType::Ssn => "[SSN_REDACTED]",
            PhiType::Mrn => "[MRN_REDACTED]",
            PhiType::Email => "[EMAIL_REDACTED]",
            PhiType::DateOfBirth => "[DOB_REDACTED]",
            PhiType::Phone => "[PHONE_REDACTED]",
            PhiType::Address => "[ADDRESS_REDACTED]",
            PhiType::Name => "[NAME_REDACTED]",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhiType::Ssn => "ssn",
            PhiType::Mrn => "mrn",
            PhiType::Email => "email",
            PhiType::DateOfBirth => "date_of_birth",
            PhiType::Phone => "phone",
            PhiType::Address => "address",
            PhiType::Name => "name",
        }
    }
}

impl fmt::Display for PhiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Structured pattern (regex over a well-defined format)
    Pattern,
    /// Heuristic (names)
    Heuristic,
}

/// A single detection. Exists only for the lifetime of a redaction result
/// and is deliberately not serializable.
pub struct PhiMatch {
    pub phi_type: PhiType,
    pub detector: &'static str,
    pub span: Range<usize>,
    pub replacement: &'static str,
    pub method: DetectionMethod,
    pub weight: f64,
    pub(crate) original_text: Zeroizing<String>,
}

impl PhiMatch {
    pub fn original_text(&self) -> &str {
        self.original_text.as_str()
    }
}

impl fmt::Debug for PhiMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhiMatch")
            .field("phi_type", &self.phi_type)
            .field("detector", &self.detector)
            .field("span", &self.span)
            .field("method", &self.method)
            .field("weight", &self.weight)
            .field("original_text", &"[REDACTED]")
            .finish()
    }
}

/// Text that has passed through a successful redaction.
///
/// The only constructor is private to this crate, so holding a
/// `RedactedText` proves the text crossed the redaction boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RedactedText(String);

impl RedactedText {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RedactedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RedactedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Log-safe and persistable summary of a redaction call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionAudit {
    pub match_counts: BTreeMap<PhiType, usize>,
    pub total_matches: usize,
    pub confidence: f64,
    pub low_confidence: bool,
    pub withheld: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

#[derive(Debug)]
pub struct RedactionResult {
    pub(crate) text: String,
    pub(crate) matches: Vec<PhiMatch>,
    pub(crate) confidence: f64,
    pub(crate) audit: RedactionAudit,
}

impl RedactionResult {
    pub(crate) fn withheld(reason: String) -> Self {
        Self {
            text: WITHHELD_MARKER.to_string(),
            matches: Vec::new(),
            confidence: 0.0,
            audit: RedactionAudit {
                match_counts: BTreeMap::new(),
                total_matches: 0,
                confidence: 0.0,
                low_confidence: true,
                withheld: true,
                failure_reason: Some(reason),
            },
        }
    }

    /// Redacted text, or [`WITHHELD_MARKER`] when the call failed closed
    pub fn redacted_text(&self) -> &str {
        &self.text
    }

    /// Matches in text order; empty when withheld
    pub fn matches(&self) -> &[PhiMatch] {
        &self.matches
    }

    /// Aggregate confidence in `[0, 1]`
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn audit(&self) -> &RedactionAudit {
        &self.audit
    }

    pub fn is_withheld(&self) -> bool {
        self.audit.withheld
    }

    /// Extract the text for downstream use, dropping the matches.
    ///
    /// A withheld result yields `RedactionFailure`; partial text never leaves.
    pub fn into_redacted(self) -> Result<(RedactedText, RedactionAudit), RedactionError> {
        if self.audit.withheld {
            return Err(RedactionError::RedactionFailure {
                reason: self
                    .audit
                    .failure_reason
                    .unwrap_or_else(|| "withheld".to_string()),
            });
        }
        Ok((RedactedText::new(self.text), self.audit))
    }
}
