use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Weight of a structured-pattern detection in the confidence ratio
    #[serde(default = "default_pattern_weight")]
    pub pattern_weight: f64,
    /// Weight of a heuristic (name) detection in the confidence ratio
    #[serde(default = "default_heuristic_weight")]
    pub heuristic_weight: f64,
    /// Results below this are flagged `low_confidence`, not rejected
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Larger inputs are withheld
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
}

fn default_pattern_weight() -> f64 {
    0.9
}

fn default_heuristic_weight() -> f64 {
    0.7
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_max_input_bytes() -> usize {
    1024 * 1024
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            pattern_weight: default_pattern_weight(),
            heuristic_weight: default_heuristic_weight(),
            confidence_threshold: default_confidence_threshold(),
            max_input_bytes: default_max_input_bytes(),
        }
    }
}
