use error_common::ComponentHealth;
use std::collections::BTreeMap;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use zeroize::Zeroizing;

use crate::config::RedactionConfig;
use crate::detectors::{default_detectors, PhiDetector};
use crate::error::Result;
use crate::types::{DetectionMethod, PhiMatch, RedactionAudit, RedactionResult, WITHHELD_MARKER};

const HEALTH_PROBE: &str = "Health probe: SSN 000-12-3456, contact probe.user@example.invalid";

struct Candidate {
    span: Range<usize>,
    detector: usize,
}

/// PHI redaction engine.
///
/// Detectors run in registration order; a span claimed by an earlier
/// detector is never re-scanned by a later one. Any detector error, panic
/// or malformed span fails the whole call closed.
pub struct PhiRedactor {
    detectors: Vec<Box<dyn PhiDetector>>,
    config: RedactionConfig,
}

impl PhiRedactor {
    /// Engine with the default detector list
    pub fn new(config: RedactionConfig) -> Result<Self> {
        Ok(Self::with_detectors(config, default_detectors()?))
    }

    /// Engine with a caller-supplied detector list, in registration order
    pub fn with_detectors(config: RedactionConfig, detectors: Vec<Box<dyn PhiDetector>>) -> Self {
        tracing::debug!(detectors = detectors.len(), "PHI redactor initialised");
        Self { detectors, config }
    }

    pub fn config(&self) -> &RedactionConfig {
        &self.config
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn redact(&self, text: &str) -> RedactionResult {
        if text.len() > self.config.max_input_bytes {
            return self.fail_closed(format!(
                "input of {} bytes exceeds limit of {}",
                text.len(),
                self.config.max_input_bytes
            ));
        }

        let candidates = match self.detect(text) {
            Ok(candidates) => candidates,
            Err(reason) => return self.fail_closed(reason),
        };

        let mut output = String::with_capacity(text.len());
        let mut matches = Vec::with_capacity(candidates.len());
        let mut cursor = 0usize;

        for candidate in candidates {
            let (Some(detector), Some(before), Some(original)) = (
                self.detectors.get(candidate.detector),
                text.get(cursor..candidate.span.start),
                text.get(candidate.span.clone()),
            ) else {
                return self.fail_closed("span bookkeeping out of order".to_string());
            };

            let phi_type = detector.phi_type();
            output.push_str(before);
            output.push_str(phi_type.placeholder());
            matches.push(PhiMatch {
                phi_type,
                detector: detector.name(),
                span: candidate.span.clone(),
                replacement: phi_type.placeholder(),
                method: detector.method(),
                weight: self.weight(detector.method()),
                original_text: Zeroizing::new(original.to_string()),
            });
            cursor = candidate.span.end;
        }

        let Some(rest) = text.get(cursor..) else {
            return self.fail_closed("span bookkeeping out of order".to_string());
        };
        output.push_str(rest);

        if matches.iter().any(|m| output.contains(m.original_text())) {
            return self.fail_closed("matched text survived redaction".to_string());
        }

        let confidence = aggregate_confidence(&matches);
        let mut match_counts = BTreeMap::new();
        for m in &matches {
            let count = match_counts.entry(m.phi_type).or_insert(0usize);
            *count = count.saturating_add(1);
        }
        let low_confidence = confidence < self.config.confidence_threshold;

        if low_confidence {
            tracing::warn!(
                total_matches = matches.len(),
                confidence,
                threshold = self.config.confidence_threshold,
                "Redaction confidence below threshold"
            );
        } else {
            tracing::debug!(
                total_matches = matches.len(),
                phi_types = ?match_counts,
                confidence,
                "Redaction complete"
            );
        }

        RedactionResult {
            text: output,
            audit: RedactionAudit {
                match_counts,
                total_matches: matches.len(),
                confidence,
                low_confidence,
                withheld: false,
                failure_reason: None,
            },
            matches,
            confidence,
        }
    }

    /// Self-check: true only if detection finds nothing in `redacted` and no
    /// text matched in `original` appears in `redacted`.
    pub fn validate(&self, original: &str, redacted: &str) -> bool {
        if redacted == WITHHELD_MARKER {
            return true;
        }

        match self.detect(redacted) {
            Ok(leftover) if leftover.is_empty() => {}
            Ok(leftover) => {
                tracing::warn!(remaining = leftover.len(), "Validation found PHI after redaction");
                return false;
            }
            Err(reason) => {
                tracing::warn!(reason = %reason, "Validation could not run detectors");
                return false;
            }
        }

        match self.detect(original) {
            Ok(found) => found.iter().all(|candidate| {
                original
                    .get(candidate.span.clone())
                    .is_some_and(|matched| !redacted.contains(matched))
            }),
            Err(reason) => {
                tracing::warn!(reason = %reason, "Validation could not run detectors");
                false
            }
        }
    }

    /// Runs the detector list over a fixed synthetic probe.
    pub fn health(&self) -> ComponentHealth {
        let result = self.redact(HEALTH_PROBE);
        if result.is_withheld() {
            return ComponentHealth::unhealthy("phi_redaction", "probe redaction was withheld");
        }
        if result.matches().len() < 2 || !self.validate(HEALTH_PROBE, result.redacted_text()) {
            return ComponentHealth::unhealthy("phi_redaction", "probe PHI was not fully redacted");
        }
        ComponentHealth::healthy("phi_redaction")
    }

    fn detect(&self, text: &str) -> std::result::Result<Vec<Candidate>, String> {
        // start -> end of every claimed span
        let mut claimed: BTreeMap<usize, usize> = BTreeMap::new();
        let mut selected = Vec::new();

        for (index, detector) in self.detectors.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| detector.detect(text)));
            let mut spans = match outcome {
                Ok(Ok(spans)) => spans,
                Ok(Err(error)) => return Err(error.to_string()),
                Err(_) => return Err(format!("detector '{}' panicked", detector.name())),
            };
            spans.sort_by_key(|span| (span.start, std::cmp::Reverse(span.end)));

            for span in spans {
                if !is_valid_span(text, &span) {
                    return Err(format!("detector '{}' returned an invalid span", detector.name()));
                }
                if overlaps(&claimed, &span) {
                    continue;
                }
                claimed.insert(span.start, span.end);
                selected.push(Candidate {
                    span,
                    detector: index,
                });
            }
        }

        // Other occurrences of matched text are the same PHI
        let originals: Vec<(Zeroizing<String>, usize)> = selected
            .iter()
            .filter_map(|c| {
                text.get(c.span.clone())
                    .map(|s| (Zeroizing::new(s.to_string()), c.detector))
            })
            .collect();
        for (original, detector) in &originals {
            for (start, found) in text.match_indices(original.as_str()) {
                let span = start..start.saturating_add(found.len());
                if overlaps(&claimed, &span) {
                    continue;
                }
                claimed.insert(span.start, span.end);
                selected.push(Candidate {
                    span,
                    detector: *detector,
                });
            }
        }

        selected.sort_by_key(|c| c.span.start);
        Ok(selected)
    }

    fn weight(&self, method: DetectionMethod) -> f64 {
        match method {
            DetectionMethod::Pattern => self.config.pattern_weight,
            DetectionMethod::Heuristic => self.config.heuristic_weight,
        }
    }

    fn fail_closed(&self, reason: String) -> RedactionResult {
        tracing::error!(reason = %reason, "Redaction failed closed; output withheld");
        RedactionResult::withheld(reason)
    }
}

fn is_valid_span(text: &str, span: &Range<usize>) -> bool {
    span.start < span.end
        && span.end <= text.len()
        && text.is_char_boundary(span.start)
        && text.is_char_boundary(span.end)
}

fn overlaps(claimed: &BTreeMap<usize, usize>, span: &Range<usize>) -> bool {
    claimed
        .range(..span.end)
        .next_back()
        .is_some_and(|(_, &end)| end > span.start)
}

/// Weighted ratio of detections, clamped to `[0, 1]`; 1.0 with no detections.
fn aggregate_confidence(matches: &[PhiMatch]) -> f64 {
    if matches.is_empty() {
        return 1.0;
    }
    let total: f64 = matches.iter().map(|m| m.weight).sum();
    #[allow(clippy::cast_precision_loss)]
    let ratio = total / matches.len() as f64;
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
