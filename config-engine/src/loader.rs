use std::path::PathBuf;

use crate::error::Result;
use crate::settings::NightingaleConfig;

/// Prefix of environment overrides, e.g. `NIGHTINGALE__AUTHORITY__TOKEN_TTL_SECS`
pub const ENV_PREFIX: &str = "NIGHTINGALE";
/// Separator between the prefix and nested section keys
pub const ENV_SEPARATOR: &str = "__";

/// Layers built-in defaults, an optional file and the environment, in that
/// order of precedence (later wins).
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: Vec<(String, String)>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            file: None,
            env_prefix: Some(ENV_PREFIX.to_string()),
            overrides: Vec::new(),
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// YAML, TOML or JSON file; the format follows the extension
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Highest-precedence value for a dotted key such as `authority.issuer`
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Build the configuration without validating it.
    pub fn load(&self) -> Result<NightingaleConfig> {
        let mut builder = config::Config::builder().set_default("environment", "development")?;

        if let Some(path) = &self.file {
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }
        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                config::Environment::with_prefix(prefix)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            );
        }
        for (key, value) in &self.overrides {
            builder = builder.set_override(key.as_str(), value.as_str())?;
        }

        let config: NightingaleConfig = builder.build()?.try_deserialize()?;
        tracing::info!(
            environment = %config.environment,
            from_file = self.file.is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Build and validate the configuration.
    pub fn load_validated(&self) -> Result<NightingaleConfig> {
        let config = self.load()?;
        config.validate()?;
        Ok(config)
    }
}
