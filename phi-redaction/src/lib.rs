//! PHI detection and redaction
//!
//! The redaction engine is the boundary between raw clinical text and every
//! component that may store it or send it to an AI service. It runs an
//! ordered list of typed detectors, replaces each detection with a fixed
//! per-type placeholder and fails closed: any detector fault produces the
//! `[PROCESSING_WITHHELD]` marker and no partial text.
//!
//! # Detectors (registration order)
//!
//! | Detector | Type | Method |
//! |---|---|---|
//! | `ssn` | national id numbers (with optional label) | pattern |
//! | `mrn` | labelled medical record numbers | pattern |
//! | `email` | email addresses | pattern |
//! | `date_of_birth` | full dates (with optional DOB label) | pattern |
//! | `phone` | North American phone numbers | pattern |
//! | `address` | street addresses | pattern |
//! | `honorific_name` | `Dr.`/`Mr.`/`Mrs.`/`Ms.`/`Prof.` + name | heuristic |
//! | `capitalized_name` | runs of capitalized words | heuristic |
//!
//! # Example
//!
//! ```rust
//! use phi_redaction::{PhiRedactor, RedactionConfig};
//!
//! let redactor = PhiRedactor::new(RedactionConfig::default()).unwrap();
//! let result = redactor.redact("SSN 123-45-6789, patient reports headache 7/10");
//! assert_eq!(result.redacted_text(), "[SSN_REDACTED], patient reports headache 7/10");
//!
//! let (text, audit) = result.into_redacted().unwrap();
//! assert_eq!(audit.total_matches, 1);
//! assert!(redactor.validate("SSN 123-45-6789, patient reports headache 7/10", text.as_str()));
//! ```
//!
//! `RedactedText` can only be obtained from a successful redaction, so any
//! API that takes it cannot be handed raw text.

pub mod config;
pub mod detectors;
pub mod engine;
pub mod error;
pub mod types;

pub use config::RedactionConfig;
pub use detectors::{default_detectors, CapitalizedNameDetector, PatternDetector, PhiDetector};
pub use engine::PhiRedactor;
pub use error::{DetectorError, RedactionError, Result};
pub use types::*;
