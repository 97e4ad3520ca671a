//! Common error handling utilities for the Nightingale privacy pipeline
//!
//! Every pipeline crate defines its own `thiserror` enum; this crate supplies
//! the pieces they share:
//!
//! - **Error Codes**: stable string codes (`CONSENT_1001`, `AUTH_2002`, ...)
//!   that can be logged and returned without exposing error messages
//! - **`NightingaleError`**: the workspace-level error used by binaries and
//!   integration code, carrying the originating code
//! - **Health reports**: `ComponentHealth`, shared by every component that
//!   exposes a health probe
//! - **Logging helper**: logs errors by code so messages never reach
//!   production logs above debug level
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, NightingaleError};
//!
//! let error = NightingaleError::Consent {
//!     code: codes::consent::CONSENT_INSUFFICIENT,
//!     message: "recording consent missing".to_string(),
//! };
//! assert_eq!(error.code(), "CONSENT_1001");
//! ```

pub mod codes;
pub mod health;
pub mod types;

pub use codes::ErrorCode;
pub use health::{overall_status, ComponentHealth, HealthStatus};
pub use types::*;
