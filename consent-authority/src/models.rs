use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::consent::ConsentGrant;

/// JWT claims carried by a session credential
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Hex SHA-256 of the salted subject identifier
    pub sub: String,

    /// Session ID
    pub sid: String,

    /// JWT ID (unique per issued token, including refreshes)
    pub jti: String,

    /// Issuer
    pub iss: String,

    /// Issued at (seconds since epoch)
    pub iat: i64,

    /// Expiration (seconds since epoch)
    pub exp: i64,

    /// Immutable consent snapshot
    pub consent: ConsentGrant,
}

/// Signed credential handed to the caller
#[derive(Clone, Serialize)]
pub struct SessionCredential {
    pub token: String,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("token", &"[REDACTED]")
            .field("session_id", &self.session_id)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Verified view of a credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentContext {
    pub hashed_subject_id: String,
    pub session_id: Uuid,
    pub token_id: String,
    pub consent: ConsentGrant,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ConsentContext {
    /// Seconds until expiry; negative once expired
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        self.expires_at.signed_duration_since(now).num_seconds()
    }
}

/// The only credential view intended for logs
#[derive(Debug, Clone, Serialize)]
pub struct AuditInfo {
    pub subject_prefix: String,
    pub session_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub granted_flags: usize,
    pub expired: bool,
}
