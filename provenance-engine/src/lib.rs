//! Provenance mapping for redacted transcript chunks
//!
//! Every chunk that passes redaction is bound to the timestamped source
//! windows it came from and given stable reference ids (`S1`, `S2`, ...).
//! Generated summary statements cite those ids, which makes each statement
//! traceable back to the recording.
//!
//! - Ids are numbered per session in assignment order and capped per chunk
//! - The i-th id of a chunk carries the i-th timestamp window
//! - Chunks without timestamps get one id over the nominal `0.0–30.0 s`
//!   window and are marked `degraded`
//! - Spans are append-only and only released explicitly
//!
//! ```rust
//! use phi_redaction::{PhiRedactor, RedactionConfig};
//! use provenance_engine::{ProvenanceConfig, ProvenanceMapper};
//! use uuid::Uuid;
//!
//! let redactor = PhiRedactor::new(RedactionConfig::default()).unwrap();
//! let (text, _audit) = redactor.redact("reports headache 7/10").into_redacted().unwrap();
//!
//! let mapper = ProvenanceMapper::new(ProvenanceConfig::default());
//! let span = mapper.map(text, &[], Uuid::new_v4()).unwrap();
//! assert_eq!((span.start_time, span.end_time), (0.0, 30.0));
//! assert_eq!(span.ref_ids(), vec!["S1"]);
//! ```

pub mod config;
pub mod error;
pub mod mapper;
pub mod models;

pub use config::ProvenanceConfig;
pub use error::{ProvenanceError, Result};
pub use mapper::ProvenanceMapper;
pub use models::*;
