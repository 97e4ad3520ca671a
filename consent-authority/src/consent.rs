use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{AuthError, Result};

/// One category of processing a subject can consent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentFlag {
    Recording,
    Transcription,
    AiProcessing,
    Storage,
    SummaryGeneration,
}

impl ConsentFlag {
    pub const ALL: [ConsentFlag; 5] = [
        ConsentFlag::Recording,
        ConsentFlag::Transcription,
        ConsentFlag::AiProcessing,
        ConsentFlag::Storage,
        ConsentFlag::SummaryGeneration,
    ];

    /// Flags without which no session may be issued
    pub const MINIMUM: [ConsentFlag; 3] = [
        ConsentFlag::Recording,
        ConsentFlag::Transcription,
        ConsentFlag::AiProcessing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentFlag::Recording => "recording",
            ConsentFlag::Transcription => "transcription",
            ConsentFlag::AiProcessing => "ai_processing",
            ConsentFlag::Storage => "storage",
            ConsentFlag::SummaryGeneration => "summary_generation",
        }
    }
}

impl fmt::Display for ConsentFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsentFlag {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "recording" | "audio_recording" => Ok(ConsentFlag::Recording),
            "transcription" => Ok(ConsentFlag::Transcription),
            "ai_processing" | "aiProcessing" => Ok(ConsentFlag::AiProcessing),
            "storage" | "data_storage" => Ok(ConsentFlag::Storage),
            "summary_generation" | "summaryGeneration" => Ok(ConsentFlag::SummaryGeneration),
            other => Err(AuthError::UnknownConsentKey(other.to_string())),
        }
    }
}

/// Operations gated by consent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    RecordAudio,
    Transcribe,
    AiProcess,
    StoreData,
    GenerateSummary,
}

impl Operation {
    pub fn required_flag(&self) -> ConsentFlag {
        match self {
            Operation::RecordAudio => ConsentFlag::Recording,
            Operation::Transcribe => ConsentFlag::Transcription,
            Operation::AiProcess => ConsentFlag::AiProcessing,
            Operation::StoreData => ConsentFlag::Storage,
            Operation::GenerateSummary => ConsentFlag::SummaryGeneration,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::RecordAudio => "record_audio",
            Operation::Transcribe => "transcribe",
            Operation::AiProcess => "ai_process",
            Operation::StoreData => "store_data",
            Operation::GenerateSummary => "generate_summary",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "record_audio" => Ok(Operation::RecordAudio),
            "transcribe" => Ok(Operation::Transcribe),
            "ai_process" => Ok(Operation::AiProcess),
            "store_data" => Ok(Operation::StoreData),
            "generate_summary" => Ok(Operation::GenerateSummary),
            other => Err(AuthError::UnknownOperation(other.to_string())),
        }
    }
}

/// Consent snapshot embedded in a session credential.
///
/// Missing keys deserialize as `false`; unknown keys are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsentGrant {
    #[serde(default, alias = "audio_recording")]
    pub recording: bool,
    #[serde(default)]
    pub transcription: bool,
    #[serde(default, alias = "aiProcessing")]
    pub ai_processing: bool,
    #[serde(default, alias = "data_storage")]
    pub storage: bool,
    #[serde(default, alias = "summaryGeneration")]
    pub summary_generation: bool,
}

impl ConsentGrant {
    /// Every flag granted
    pub fn full() -> Self {
        Self {
            recording: true,
            transcription: true,
            ai_processing: true,
            storage: true,
            summary_generation: true,
        }
    }

    /// Only the flags required to open a session
    pub fn minimum() -> Self {
        Self {
            recording: true,
            transcription: true,
            ai_processing: true,
            ..Self::default()
        }
    }

    /// Build a grant from a dynamically-shaped map, validated at the boundary.
    ///
    /// Each flag may appear once, under its name or one alias.
    pub fn from_flags(flags: &HashMap<String, bool>) -> Result<Self> {
        let mut grant = Self::default();
        let mut seen = HashSet::new();
        for (key, granted) in flags {
            let flag: ConsentFlag = key.parse()?;
            if !seen.insert(flag) {
                return Err(AuthError::DuplicateConsentKey { flag });
            }
            grant.set(flag, *granted);
        }
        Ok(grant)
    }

    pub fn is_granted(&self, flag: ConsentFlag) -> bool {
        match flag {
            ConsentFlag::Recording => self.recording,
            ConsentFlag::Transcription => self.transcription,
            ConsentFlag::AiProcessing => self.ai_processing,
            ConsentFlag::Storage => self.storage,
            ConsentFlag::SummaryGeneration => self.summary_generation,
        }
    }

    pub fn with(mut self, flag: ConsentFlag, granted: bool) -> Self {
        self.set(flag, granted);
        self
    }

    fn set(&mut self, flag: ConsentFlag, granted: bool) {
        match flag {
            ConsentFlag::Recording => self.recording = granted,
            ConsentFlag::Transcription => self.transcription = granted,
            ConsentFlag::AiProcessing => self.ai_processing = granted,
            ConsentFlag::Storage => self.storage = granted,
            ConsentFlag::SummaryGeneration => self.summary_generation = granted,
        }
    }

    pub fn has_minimum_consent(&self) -> bool {
        self.missing_minimum().is_empty()
    }

    pub fn missing_minimum(&self) -> Vec<ConsentFlag> {
        ConsentFlag::MINIMUM
            .into_iter()
            .filter(|flag| !self.is_granted(*flag))
            .collect()
    }

    pub fn permits(&self, operation: Operation) -> bool {
        self.is_granted(operation.required_flag())
    }

    pub fn granted_count(&self) -> usize {
        ConsentFlag::ALL
            .into_iter()
            .filter(|flag| self.is_granted(*flag))
            .count()
    }
}
