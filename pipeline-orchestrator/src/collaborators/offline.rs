//! Offline collaborators for demos and local runs.

use async_trait::async_trait;
use error_common::ComponentHealth;
use std::time::Duration;

use super::summarizer::{SummaryRequest, SummaryResponse, SummaryStatement, Summarizer};
use super::transcription::{AudioInput, RawTranscript, TimestampRecord, Transcript, TranscriptMetadata, TranscriptionService};
use crate::error::CollaboratorError;

/// Treats the audio payload as UTF-8 speech text and times one segment
/// per sentence.
#[derive(Debug, Clone)]
pub struct LoopbackTranscriber {
    seconds_per_segment: f64,
}

impl Default for LoopbackTranscriber {
    fn default() -> Self {
        Self {
            seconds_per_segment: 4.0,
        }
    }
}

impl LoopbackTranscriber {
    pub fn new(seconds_per_segment: f64) -> Self {
        Self { seconds_per_segment }
    }
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '?', '!'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
}

#[async_trait]
impl TranscriptionService for LoopbackTranscriber {
    async fn transcribe(&self, audio: &AudioInput) -> Result<Transcript, CollaboratorError> {
        let text = std::str::from_utf8(&audio.data)
            .map_err(|_| CollaboratorError::Rejected("audio payload is not UTF-8 speech text".into()))?;

        let mut start = 0.0_f64;
        let timestamps: Vec<TimestampRecord> = sentences(text)
            .map(|sentence| {
                let record = TimestampRecord {
                    start_time: start,
                    end_time: start + self.seconds_per_segment,
                    text: RawTranscript::new(sentence),
                };
                start += self.seconds_per_segment;
                record
            })
            .collect();

        Ok(Transcript {
            text: RawTranscript::new(text),
            confidence: 0.95,
            metadata: TranscriptMetadata {
                provider: "loopback".into(),
                model: None,
                language: "en-US".into(),
                duration_ms: Duration::try_from_secs_f64(start)
                    .ok()
                    .and_then(|elapsed| u64::try_from(elapsed.as_millis()).ok())
                    .unwrap_or(0),
            },
            timestamps,
        })
    }

    async fn health(&self) -> ComponentHealth {
        ComponentHealth::healthy("transcription.loopback")
    }
}

/// Emits the first sentence of every segment, citing that segment's
/// first reference id.
#[derive(Debug, Clone, Default)]
pub struct ExtractiveSummarizer;

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse, CollaboratorError> {
        let statements = request
            .segments
            .iter()
            .filter_map(|segment| {
                let first = sentences(segment.text.as_str()).next()?;
                let reference = segment.reference_ids.first()?;
                Some(SummaryStatement {
                    text: first.to_string(),
                    reference_ids: vec![reference.clone()],
                })
            })
            .collect();

        Ok(SummaryResponse { statements })
    }

    async fn health(&self) -> ComponentHealth {
        ComponentHealth::healthy("summarizer.extractive")
    }
}
