use consent_authority::AuthorityConfig;
use logger_redacted::{LogFormat, LoggerConfig};
use phi_redaction::RedactionConfig;
use pipeline_orchestrator::{PipelineConfig, RetentionPolicy};
use provenance_engine::ProvenanceConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment compliance switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    #[serde(default = "default_true")]
    pub hipaa_mode: bool,
    /// The pipeline always redacts; a deployment declaring otherwise is
    /// rejected in HIPAA mode
    #[serde(default = "default_true")]
    pub redaction_enabled: bool,
    #[serde(default)]
    pub retention: RetentionPolicy,
}

fn default_true() -> bool {
    true
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            hipaa_mode: true,
            redaction_enabled: true,
            retention: RetentionPolicy::default(),
        }
    }
}

/// Complete Nightingale configuration, one section per component.
#[derive(Debug, Default, Deserialize)]
pub struct NightingaleConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub authority: AuthorityConfig,
    #[serde(default)]
    pub redaction: RedactionConfig,
    #[serde(default)]
    pub provenance: ProvenanceConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggerConfig,
    #[serde(default)]
    pub compliance: ComplianceConfig,
}

/// Secret-free view of a configuration, safe to print
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub environment: Environment,
    pub hipaa_mode: bool,
    pub issuer: String,
    pub token_ttl_secs: i64,
    pub refresh_threshold_secs: i64,
    pub confidence_threshold: f64,
    pub max_refs_per_chunk: usize,
    pub max_attempts: u32,
    pub retention_days: i64,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl NightingaleConfig {
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            environment: self.environment,
            hipaa_mode: self.compliance.hipaa_mode,
            issuer: self.authority.issuer.clone(),
            token_ttl_secs: self.authority.token_ttl_secs,
            refresh_threshold_secs: self.authority.refresh_threshold_secs,
            confidence_threshold: self.redaction.confidence_threshold,
            max_refs_per_chunk: self.provenance.max_refs_per_chunk,
            max_attempts: self.pipeline.retry.max_attempts,
            retention_days: self.compliance.retention.max_age_days,
            log_level: self.logging.level.clone(),
            log_format: self.logging.format,
        }
    }
}
