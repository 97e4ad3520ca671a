use async_trait::async_trait;
use error_common::ComponentHealth;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::CollaboratorError;

/// Captured audio handed to the transcription service
#[derive(Clone)]
pub struct AudioInput {
    pub data: Vec<u8>,
    pub sample_rate: u32,
    pub format: String,
}

impl AudioInput {
    pub fn new(data: Vec<u8>, sample_rate: u32, format: impl Into<String>) -> Self {
        Self {
            data,
            sample_rate,
            format: format.into(),
        }
    }
}

impl fmt::Debug for AudioInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioInput")
            .field("bytes", &self.data.len())
            .field("sample_rate", &self.sample_rate)
            .field("format", &self.format)
            .finish()
    }
}

/// Unredacted transcript text. Wiped on drop and never printed.
pub struct RawTranscript(Zeroizing<String>);

impl RawTranscript {
    pub fn new(text: impl Into<String>) -> Self {
        Self(Zeroizing::new(text.into()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawTranscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawTranscript([REDACTED; {} bytes])", self.0.len())
    }
}

/// One timed segment of a transcript
#[derive(Debug)]
pub struct TimestampRecord {
    pub start_time: f64,
    pub end_time: f64,
    pub text: RawTranscript,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    pub provider: String,
    pub model: Option<String>,
    pub language: String,
    pub duration_ms: u64,
}

#[derive(Debug)]
pub struct Transcript {
    pub text: RawTranscript,
    pub confidence: f32,
    pub timestamps: Vec<TimestampRecord>,
    pub metadata: TranscriptMetadata,
}

#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe(&self, audio: &AudioInput) -> Result<Transcript, CollaboratorError>;

    async fn health(&self) -> ComponentHealth {
        ComponentHealth::healthy("transcription")
    }
}
