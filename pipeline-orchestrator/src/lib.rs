//! Consent-gated session orchestration
//!
//! Drives one consultation session through
//! `Authenticated → Recording → Transcribed → Redacted → Summarized → Completed`:
//!
//! - every call re-verifies the session credential and checks the consent
//!   it carries for the operation
//! - raw transcript text goes straight from the transcription service into
//!   the redaction engine and is dropped right after
//! - provenance mapping, summarization and storage only see `RedactedText`
//! - a failing stage halts the session where it stands; external stages
//!   are retried with backoff first, local stages never are
//! - summary statements that cite no known reference id are excluded
//!
//! Collaborators (transcription, summarizer, consultation store) are
//! `async_trait` capabilities; [`collaborators::offline`] has local
//! stand-ins.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod session;

pub use collaborators::*;
pub use config::PipelineConfig;
pub use error::{CollaboratorError, PipelineError, Result};
pub use orchestrator::{
    Collaborators, CompletionOutcome, PipelineHealth, PipelineOrchestrator, ProcessedChunk, SummaryOutcome,
};
pub use retry::{run_with_retry, RetryPolicy};
pub use session::{GroundedStatement, HaltRecord, PipelineContext, PipelineStage};
