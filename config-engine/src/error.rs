use error_common::{codes, ErrorCode, NightingaleError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration could not be loaded: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration validation failed: {}", issues.join("; "))]
    Invalid { issues: Vec<String> },
}

impl ConfigError {
    pub fn issues(&self) -> &[String] {
        match self {
            ConfigError::Invalid { issues } => issues,
            ConfigError::Load(_) => &[],
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            ConfigError::Load(_) => codes::configuration::LOAD_FAILED,
            ConfigError::Invalid { .. } => codes::configuration::INVALID_CONFIG,
        }
    }
}

impl From<ConfigError> for NightingaleError {
    fn from(error: ConfigError) -> Self {
        NightingaleError::Config {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
