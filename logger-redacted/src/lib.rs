//! PHI-safe logging for the Nightingale privacy pipeline
//!
//! Nothing identifying may reach a log line: only counts, PHI type names and
//! truncated hash prefixes of identifiers. This crate supplies the pieces
//! every other crate uses to keep to that rule:
//!
//! - **`init_tracing`**: installs the `tracing-subscriber` registry with an
//!   `EnvFilter`, a pretty (development) or JSON (production) console layer
//!   and an optional daily rolling file layer
//! - **`hash_prefix` / `truncate_hash`**: the 8-character identifier form
//!   allowed in logs
//! - **`LogScrubber`**: scrubs identifiers out of third-party messages before
//!   they are logged
//! - **`audit_event!`**: structured audit events on the `audit` target
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{hash_prefix, init_tracing, LoggerConfig};
//!
//! let _guard = init_tracing(&LoggerConfig::production()).expect("logging");
//! tracing::info!(subject = %hash_prefix("patient-0042"), "Session opened");
//! ```
//!
//! # Configuration
//!
//! ```yaml
//! logging:
//!   level: "info,phi_redaction=debug"
//!   format: json
//!   file:
//!     directory: /var/log/nightingale
//!     file_prefix: nightingale.log
//!   phi_logging_enabled: false
//!   audit_logging_enabled: true
//! ```

pub mod config;
pub mod error;
pub mod hashing;
pub mod macros;
pub mod redactor;
pub mod subscriber;

pub use config::*;
pub use error::{LoggerError, Result};
pub use hashing::*;
pub use redactor::*;
pub use subscriber::init_tracing;

#[doc(hidden)]
pub use tracing as __tracing;
