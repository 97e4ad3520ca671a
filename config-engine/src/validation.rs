use consent_authority::{DEVELOPMENT_SIGNING_SECRET, DEVELOPMENT_SUBJECT_SALT, MIN_SECRET_BYTES};
use secrecy::ExposeSecret;

use crate::error::{ConfigError, Result};
use crate::settings::NightingaleConfig;

impl NightingaleConfig {
    /// Deployment checks. Every failing rule is reported, not just the first.
    pub fn validate(&self) -> Result<()> {
        let issues = self.issues();
        if issues.is_empty() {
            tracing::debug!(environment = %self.environment, "Configuration validated");
            return Ok(());
        }

        tracing::error!(
            environment = %self.environment,
            issues = issues.len(),
            "Configuration validation failed"
        );
        Err(ConfigError::Invalid { issues })
    }

    fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        self.check_authority(&mut issues);
        self.check_compliance(&mut issues);
        self.check_redaction(&mut issues);
        self.check_provenance(&mut issues);
        self.check_pipeline(&mut issues);
        issues
    }

    fn check_authority(&self, issues: &mut Vec<String>) {
        let authority = &self.authority;
        let secret = authority.signing_secret.expose_secret();
        let salt = authority.subject_salt.expose_secret();

        if self.environment.is_production() {
            if secret == DEVELOPMENT_SIGNING_SECRET {
                issues.push("authority.signing_secret must be set in production".into());
            }
            if salt == DEVELOPMENT_SUBJECT_SALT {
                issues.push("authority.subject_salt must be set in production".into());
            }
        }
        if secret.len() < MIN_SECRET_BYTES {
            issues.push(format!(
                "authority.signing_secret must be at least {MIN_SECRET_BYTES} bytes"
            ));
        }
        if salt.is_empty() {
            issues.push("authority.subject_salt must not be empty".into());
        }
        if authority.token_ttl_secs <= 0 {
            issues.push("authority.token_ttl_secs must be positive".into());
        }
        if authority.leeway_secs < 0 || authority.refresh_threshold_secs < 0 {
            issues.push("authority.leeway_secs and refresh_threshold_secs must not be negative".into());
        }
    }

    fn check_compliance(&self, issues: &mut Vec<String>) {
        if self.compliance.hipaa_mode {
            if !self.compliance.redaction_enabled {
                issues.push("PHI redaction is required in HIPAA mode".into());
            }
            if self.logging.phi_logging_enabled {
                issues.push("PHI logging must be disabled in HIPAA mode".into());
            }
            if !self.logging.audit_logging_enabled {
                issues.push("Audit logging is required in HIPAA mode".into());
            }
        } else if self.environment.is_production() {
            tracing::warn!("HIPAA mode is disabled in production");
        }
        if self.compliance.retention.max_age_days < 1 {
            issues.push("compliance.retention.max_age_days must be at least 1".into());
        }
    }

    fn check_redaction(&self, issues: &mut Vec<String>) {
        let redaction = &self.redaction;
        for (name, value) in [
            ("pattern_weight", redaction.pattern_weight),
            ("heuristic_weight", redaction.heuristic_weight),
            ("confidence_threshold", redaction.confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(format!("redaction.{name} must lie in [0, 1]"));
            }
        }
        if redaction.max_input_bytes == 0 {
            issues.push("redaction.max_input_bytes must be positive".into());
        }
    }

    fn check_provenance(&self, issues: &mut Vec<String>) {
        let provenance = &self.provenance;
        let start = provenance.nominal_start_secs;
        let end = provenance.nominal_end_secs;

        if !start.is_finite() || !end.is_finite() || start < 0.0 {
            issues.push("provenance nominal window must be finite and non-negative".into());
        } else if start > end {
            issues.push("provenance.nominal_start_secs must not exceed nominal_end_secs".into());
        }
        if provenance.max_refs_per_chunk < 1 {
            issues.push("provenance.max_refs_per_chunk must be at least 1".into());
        }
    }

    fn check_pipeline(&self, issues: &mut Vec<String>) {
        let pipeline = &self.pipeline;
        if pipeline.retry.max_attempts < 1 {
            issues.push("pipeline.retry.max_attempts must be at least 1".into());
        }
        if pipeline.retry.initial_backoff_ms > pipeline.retry.max_backoff_ms {
            issues.push("pipeline.retry.initial_backoff_ms must not exceed max_backoff_ms".into());
        }
        if pipeline.transcription_timeout_ms == 0
            || pipeline.summarization_timeout_ms == 0
            || pipeline.storage_timeout_ms == 0
        {
            issues.push("pipeline stage timeouts must be positive".into());
        }
    }
}
