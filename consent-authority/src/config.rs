use secrecy::SecretString;
use serde::Deserialize;

/// Signing secret used when none is configured. Rejected in production.
pub const DEVELOPMENT_SIGNING_SECRET: &str = "nightingale-development-signing-secret-change-me";

/// Subject salt used when none is configured. Rejected in production.
pub const DEVELOPMENT_SUBJECT_SALT: &str = "nightingale-development-subject-salt";

/// Minimum HS256 key length in bytes
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Deserialize)]
pub struct AuthorityConfig {
    #[serde(default = "default_signing_secret")]
    pub signing_secret: SecretString,
    #[serde(default = "default_subject_salt")]
    pub subject_salt: SecretString,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
    /// Symmetric clock-skew allowance applied to both ends of the validity window
    #[serde(default = "default_leeway_secs")]
    pub leeway_secs: i64,
    /// Refresh is refused while more than this many seconds remain
    #[serde(default = "default_refresh_threshold_secs")]
    pub refresh_threshold_secs: i64,
}

fn default_signing_secret() -> SecretString {
    SecretString::new(DEVELOPMENT_SIGNING_SECRET.to_string())
}

fn default_subject_salt() -> SecretString {
    SecretString::new(DEVELOPMENT_SUBJECT_SALT.to_string())
}

fn default_issuer() -> String {
    "nightingale".to_string()
}

fn default_token_ttl_secs() -> i64 {
    3600
}

fn default_leeway_secs() -> i64 {
    30
}

fn default_refresh_threshold_secs() -> i64 {
    300
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            signing_secret: default_signing_secret(),
            subject_salt: default_subject_salt(),
            issuer: default_issuer(),
            token_ttl_secs: default_token_ttl_secs(),
            leeway_secs: default_leeway_secs(),
            refresh_threshold_secs: default_refresh_threshold_secs(),
        }
    }
}

impl AuthorityConfig {
    pub fn with_signing_secret(mut self, secret: impl Into<String>) -> Self {
        self.signing_secret = SecretString::new(secret.into());
        self
    }

    pub fn with_subject_salt(mut self, salt: impl Into<String>) -> Self {
        self.subject_salt = SecretString::new(salt.into());
        self
    }

    pub fn with_token_ttl_secs(mut self, ttl: i64) -> Self {
        self.token_ttl_secs = ttl;
        self
    }
}
