//! `nightingale` operator CLI
//!
//! Exercises the privacy pipeline without any external service:
//!
//! ```bash
//! nightingale issue --subject patient-0042 \
//!     --consent '{"recording":true,"transcription":true,"ai_processing":true}'
//! nightingale verify --token "$TOKEN"
//! nightingale audit-info --token "$TOKEN"
//! echo "SSN 123-45-6789, patient reports headache 7/10" | nightingale redact
//! nightingale validate-config --config config/production.toml
//! nightingale demo --without-storage
//! ```
//!
//! Every command prints JSON on stdout. Logs go to stderr. Raw PHI and
//! detected match text are never printed.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
pub use commands::{run, DEMO_TRANSCRIPT};
