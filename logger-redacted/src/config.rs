// Logger configuration
use serde::{Deserialize, Serialize};

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development
    #[default]
    Pretty,
    /// Structured JSON, for production
    Json,
}

/// Daily rolling file output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLogConfig {
    pub directory: String,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub ansi: bool,
    #[serde(default)]
    pub file: Option<FileLogConfig>,
    /// Must stay false outside local debugging; checked by config validation
    #[serde(default)]
    pub phi_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub audit_logging_enabled: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "nightingale.log".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            ansi: false,
            file: None,
            phi_logging_enabled: false,
            audit_logging_enabled: true,
        }
    }
}

impl LoggerConfig {
    /// Production defaults: JSON console output, no colours
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            ..Self::default()
        }
    }
}
