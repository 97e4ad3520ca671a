//! Boundaries to the external services the pipeline depends on.
//!
//! Transcription is the only collaborator that produces raw text, and it
//! hands it to the orchestrator alone. Summarization and storage accept
//! nothing but `RedactedText`.

pub mod offline;
pub mod storage;
pub mod summarizer;
pub mod transcription;

pub use offline::{ExtractiveSummarizer, LoopbackTranscriber};
pub use storage::{ConsultationRecord, ConsultationStore, InMemoryConsultationStore, RetentionPolicy, StoredConsultation};
pub use summarizer::{SummaryMetadata, SummaryRequest, SummaryResponse, SummarySegment, SummaryStatement, Summarizer};
pub use transcription::{AudioInput, RawTranscript, TimestampRecord, Transcript, TranscriptMetadata, TranscriptionService};
