// Error codes implementation
// Stable codes surfaced by every pipeline crate; safe to log and to return to callers.

pub mod consent {
    pub const CONSENT_INSUFFICIENT: &str = "CONSENT_1001";
    pub const UNKNOWN_CONSENT_KEY: &str = "CONSENT_1002";
    pub const UNKNOWN_OPERATION: &str = "CONSENT_1003";
    pub const CONSENT_DENIED: &str = "CONSENT_1004";
    pub const DUPLICATE_CONSENT_KEY: &str = "CONSENT_1005";
}

pub mod authentication {
    pub const TOKEN_INVALID: &str = "AUTH_2001";
    pub const TOKEN_EXPIRED: &str = "AUTH_2002";
    pub const REFRESH_NOT_NEEDED: &str = "AUTH_2003";
    pub const SIGNING_FAILED: &str = "AUTH_2004";
    pub const SUBJECT_MISMATCH: &str = "AUTH_2005";
}

pub mod redaction {
    pub const REDACTION_FAILURE: &str = "REDACT_3001";
    pub const DETECTOR_SETUP: &str = "REDACT_3002";
}

pub mod provenance {
    pub const INVALID_TIMESTAMP: &str = "PROV_4001";
    pub const DUPLICATE_CHUNK: &str = "PROV_4002";
    pub const MAPPING_DEGRADED: &str = "PROV_4003";
}

pub mod pipeline {
    pub const SESSION_NOT_FOUND: &str = "PIPE_5001";
    pub const SESSION_REVOKED: &str = "PIPE_5002";
    pub const SESSION_HALTED: &str = "PIPE_5003";
    pub const SESSION_BUSY: &str = "PIPE_5004";
    pub const INVALID_TRANSITION: &str = "PIPE_5005";
    pub const EXTERNAL_STAGE_FAILED: &str = "PIPE_5006";
}

pub mod configuration {
    pub const INVALID_CONFIG: &str = "CONFIG_6001";
    pub const LOAD_FAILED: &str = "CONFIG_6002";
}

pub mod storage {
    pub const KEY_EXISTS: &str = "STORE_7001";
    pub const KEY_NOT_FOUND: &str = "STORE_7002";
}

/// Implemented by every crate-level error so callers can report a stable code
/// without inspecting (or logging) the error's message.
pub trait ErrorCode {
    fn code(&self) -> &'static str;
}
