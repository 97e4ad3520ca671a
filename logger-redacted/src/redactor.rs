use base64::{engine::general_purpose, Engine as _};
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

use crate::error::Result;

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";
const PHONE_PATTERN: &str = r"(?:\+?1[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b";
const SSN_PATTERN: &str = r"\b\d{3}-\d{2}-\d{4}\b";
const CREDIT_CARD_PATTERN: &str = r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b";
const IP_PATTERN: &str = r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b";
const MRN_PATTERN: &str = r"(?i)\bMRN[\s:#-]*\d{4,}\b";

/// Scrubber configuration for free-form log messages
#[derive(Debug, Clone)]
pub struct ScrubConfig {
    pub scrub_emails: bool,
    pub scrub_phones: bool,
    pub scrub_ssn: bool,
    pub scrub_credit_cards: bool,
    pub scrub_ip_addresses: bool,
    pub scrub_mrn: bool,
    /// Replace values with a short hash tag so repeated values can be correlated
    pub hash_for_correlation: bool,
}

impl Default for ScrubConfig {
    fn default() -> Self {
        Self {
            scrub_emails: true,
            scrub_phones: true,
            scrub_ssn: true,
            scrub_credit_cards: true,
            scrub_ip_addresses: true,
            scrub_mrn: true,
            hash_for_correlation: true,
        }
    }
}

struct Rule {
    label: &'static str,
    mask: &'static str,
    regex: Regex,
}

/// Scrubs identifiers out of messages we do not control (collaborator errors,
/// upstream responses) before they are logged.
///
/// This is a last line of defence for log output, not the PHI redaction
/// boundary; pipeline text goes through the `phi-redaction` engine.
pub struct LogScrubber {
    rules: Vec<Rule>,
    hash_for_correlation: bool,
}

impl LogScrubber {
    pub fn new(config: ScrubConfig) -> Result<Self> {
        let candidates = [
            (config.scrub_ssn, "SSN", "***-**-****", SSN_PATTERN),
            (config.scrub_credit_cards, "CC", "****-****-****-****", CREDIT_CARD_PATTERN),
            (config.scrub_emails, "EMAIL", "***@***", EMAIL_PATTERN),
            (config.scrub_mrn, "MRN", "MRN******", MRN_PATTERN),
            (config.scrub_phones, "PHONE", "(***) ***-****", PHONE_PATTERN),
            (config.scrub_ip_addresses, "IP", "***.***.***.***", IP_PATTERN),
        ];

        let mut rules = Vec::new();
        for (enabled, label, mask, pattern) in candidates {
            if enabled {
                rules.push(Rule {
                    label,
                    mask,
                    regex: Regex::new(pattern)?,
                });
            }
        }

        Ok(Self {
            rules,
            hash_for_correlation: config.hash_for_correlation,
        })
    }

    pub fn scrub(&self, text: &str) -> String {
        let mut result = text.to_string();
        for rule in &self.rules {
            result = rule
                .regex
                .replace_all(&result, |caps: &Captures| {
                    let matched = caps.get(0).map_or("", |m| m.as_str());
                    if self.hash_for_correlation {
                        format!("{}[{}]", rule.label, hash_value(matched))
                    } else {
                        rule.mask.to_string()
                    }
                })
                .into_owned();
        }
        result
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    // First 8 bytes are enough for correlation
    general_purpose::STANDARD.encode(digest.get(..8).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masking_scrubber() -> LogScrubber {
        LogScrubber::new(ScrubConfig {
            hash_for_correlation: false,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_email_scrubbing() {
        let scrubbed = masking_scrubber().scrub("upstream rejected john.doe@example.com");
        assert_eq!(scrubbed, "upstream rejected ***@***");
    }

    #[test]
    fn test_phone_scrubbing() {
        let scrubbed = masking_scrubber().scrub("Call me at (555) 123-4567");
        assert!(scrubbed.contains("(***) ***-****"));
        assert!(!scrubbed.contains("4567"));
    }

    #[test]
    fn test_ssn_and_mrn_scrubbing() {
        let scrubbed = masking_scrubber().scrub("bad record MRN: 00123456 for 123-45-6789");
        assert!(!scrubbed.contains("00123456"));
        assert!(!scrubbed.contains("123-45-6789"));
    }

    #[test]
    fn test_hash_tags_correlate() {
        let scrubber = LogScrubber::new(ScrubConfig::default()).unwrap();
        let first = scrubber.scrub("jane@example.org");
        let second = scrubber.scrub("retry for jane@example.org");
        assert!(first.starts_with("EMAIL["));
        assert!(second.ends_with(&first));
    }

    #[test]
    fn test_clean_text_is_untouched() {
        let text = "transcription backend returned 503";
        assert_eq!(masking_scrubber().scrub(text), text);
    }
}
