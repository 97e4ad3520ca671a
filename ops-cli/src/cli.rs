use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nightingale")]
#[command(version, about = "Operate the Nightingale privacy pipeline offline")]
pub struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long, env = "NIGHTINGALE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter directive, overriding the configured level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Issue a consent-scoped session credential
    Issue {
        /// Subject identifier; only its salted hash enters the credential
        #[arg(long)]
        subject: String,
        /// JSON object of consent flags, e.g. '{"recording":true,...}'
        #[arg(long)]
        consent: String,
    },
    /// Verify a credential and show its consent
    Verify {
        #[arg(long, env = "NIGHTINGALE_TOKEN")]
        token: String,
    },
    /// Show the log-safe view of a credential
    AuditInfo {
        #[arg(long, env = "NIGHTINGALE_TOKEN")]
        token: String,
    },
    /// Redact text read from stdin
    Redact {
        /// Fail unless detection finds nothing left in the output
        #[arg(long)]
        validate: bool,
    },
    /// Load and validate the configuration
    ValidateConfig,
    /// Run one session end to end against offline collaborators
    Demo {
        /// Text file standing in for recorded speech
        #[arg(long)]
        transcript: Option<PathBuf>,
        /// Withhold summary generation consent
        #[arg(long)]
        without_summary: bool,
        /// Withhold storage consent
        #[arg(long)]
        without_storage: bool,
    },
}
