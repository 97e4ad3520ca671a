use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Per-attempt timeout for the transcription service
    #[serde(default = "default_stage_timeout_ms")]
    pub transcription_timeout_ms: u64,
    /// Per-attempt timeout for the summarizer
    #[serde(default = "default_stage_timeout_ms")]
    pub summarization_timeout_ms: u64,
    /// Per-attempt timeout for consultation storage
    #[serde(default = "default_stage_timeout_ms")]
    pub storage_timeout_ms: u64,
}

fn default_stage_timeout_ms() -> u64 {
    30_000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            transcription_timeout_ms: default_stage_timeout_ms(),
            summarization_timeout_ms: default_stage_timeout_ms(),
            storage_timeout_ms: default_stage_timeout_ms(),
        }
    }
}

impl PipelineConfig {
    pub fn transcription_timeout(&self) -> Duration {
        Duration::from_millis(self.transcription_timeout_ms)
    }

    pub fn summarization_timeout(&self) -> Duration {
        Duration::from_millis(self.summarization_timeout_ms)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }
}
