use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceConfig {
    /// Reference ids assigned to one chunk, regardless of timestamp count
    #[serde(default = "default_max_refs_per_chunk")]
    pub max_refs_per_chunk: usize,
    /// Window used when a chunk arrives without timestamps
    #[serde(default)]
    pub nominal_start_secs: f64,
    #[serde(default = "default_nominal_end_secs")]
    pub nominal_end_secs: f64,
}

fn default_max_refs_per_chunk() -> usize {
    3
}

fn default_nominal_end_secs() -> f64 {
    30.0
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            max_refs_per_chunk: default_max_refs_per_chunk(),
            nominal_start_secs: 0.0,
            nominal_end_secs: default_nominal_end_secs(),
        }
    }
}
