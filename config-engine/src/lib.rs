//! Configuration for the Nightingale privacy pipeline
//!
//! One [`NightingaleConfig`] value carries every component's settings and
//! is passed into constructors at startup; nothing reads settings from
//! global state.
//!
//! # Sources
//!
//! Later sources win:
//!
//! 1. Built-in defaults (development values)
//! 2. An optional YAML, TOML or JSON file
//! 3. Environment variables such as `NIGHTINGALE__ENVIRONMENT=production` or
//!    `NIGHTINGALE__AUTHORITY__SIGNING_SECRET=...`
//!
//! # Validation
//!
//! [`NightingaleConfig::validate`] rejects development secrets in
//! production, enforces HIPAA mode (redaction on, PHI logging off, audit
//! logging on) and checks numeric ranges.
//!
//! ```rust,no_run
//! use config_engine::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_file("config/nightingale.toml")
//!     .load_validated()?;
//! println!("{}", config.environment);
//! # Ok::<(), config_engine::ConfigError>(())
//! ```

pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, ENV_PREFIX, ENV_SEPARATOR};
pub use settings::{ComplianceConfig, ConfigSummary, Environment, NightingaleConfig};
