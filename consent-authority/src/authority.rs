use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use logger_redacted::{audit_event, truncate_hash};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::{AuthorityConfig, MIN_SECRET_BYTES};
use crate::consent::{ConsentFlag, ConsentGrant, Operation};
use crate::error::{AuthError, Result};
use crate::models::{AuditInfo, ConsentContext, SessionClaims, SessionCredential};

/// Issues and verifies consent-scoped session credentials.
///
/// The authority is stateless: revocation is recorded by the orchestrator's
/// session bookkeeping, never by mutating a credential.
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    subject_salt: SecretString,
    issuer: String,
    token_ttl_secs: i64,
    leeway_secs: i64,
    refresh_threshold_secs: i64,
    clock: Arc<dyn Clock>,
}

impl TokenAuthority {
    pub fn new(config: AuthorityConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AuthorityConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let secret = config.signing_secret.expose_secret().as_bytes();
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::Configuration(format!(
                "signing secret must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }
        if config.token_ttl_secs <= 0 {
            return Err(AuthError::Configuration("token TTL must be positive".to_string()));
        }
        if config.leeway_secs < 0 || config.refresh_threshold_secs < 0 {
            return Err(AuthError::Configuration(
                "leeway and refresh threshold must not be negative".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            subject_salt: config.subject_salt,
            issuer: config.issuer,
            token_ttl_secs: config.token_ttl_secs,
            leeway_secs: config.leeway_secs,
            refresh_threshold_secs: config.refresh_threshold_secs,
            clock,
        })
    }

    /// Issue a credential for a subject whose minimum consent is granted.
    pub fn issue(&self, subject_id: &str, consent: ConsentGrant) -> Result<SessionCredential> {
        if subject_id.trim().is_empty() {
            return Err(AuthError::InvalidSubject);
        }

        let missing = consent.missing_minimum();
        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing,
                granted_flags = consent.granted_count(),
                "Credential refused: minimum consent not granted"
            );
            return Err(AuthError::ConsentInsufficient { missing });
        }

        let hashed_subject_id = self.hash_subject(subject_id);
        let session_id = Uuid::new_v4();
        let credential = self.sign(hashed_subject_id.clone(), session_id, consent)?;

        audit_event!(
            "credential_issued",
            subject = %truncate_hash(&hashed_subject_id),
            session_id = %session_id,
            granted_flags = consent.granted_count(),
            "Session credential issued"
        );

        Ok(credential)
    }

    /// Verify signature, issuer and validity window.
    ///
    /// A token is valid iff `iat - leeway <= now < exp + leeway`.
    pub fn verify(&self, token: &str) -> Result<ConsentContext> {
        let claims = self.decode_claims(token)?;
        let now = self.clock.now().timestamp();

        if now < claims.iat.saturating_sub(self.leeway_secs) {
            return Err(AuthError::TokenInvalid("token not yet valid".to_string()));
        }
        if now >= claims.exp.saturating_add(self.leeway_secs) {
            return Err(AuthError::TokenExpired);
        }

        Self::context_from_claims(claims)
    }

    /// Re-issue a credential that is close to expiry.
    ///
    /// Consent snapshot, subject hash and session id are carried over;
    /// issue and expiry times are fresh.
    pub fn refresh(&self, token: &str) -> Result<SessionCredential> {
        let context = self.verify(token)?;
        let remaining_secs = context.remaining_secs(self.clock.now());

        if remaining_secs > self.refresh_threshold_secs {
            return Err(AuthError::RefreshNotNeeded { remaining_secs });
        }

        let credential = self.sign(
            context.hashed_subject_id.clone(),
            context.session_id,
            context.consent,
        )?;

        audit_event!(
            "credential_refreshed",
            subject = %truncate_hash(&context.hashed_subject_id),
            session_id = %context.session_id,
            granted_flags = context.consent.granted_count(),
            "Session credential refreshed"
        );

        Ok(credential)
    }

    /// Record a consent revocation for the credential's session.
    ///
    /// Returns `false` when the credential does not verify. The credential
    /// itself is untouched; callers must mark the session revoked.
    pub fn revoke(&self, token: &str, consent_type: &str) -> Result<bool> {
        let flag: ConsentFlag = consent_type.parse()?;

        let context = match self.verify(token) {
            Ok(context) => context,
            Err(error) => {
                tracing::warn!(
                    consent_flag = %flag,
                    reason = %error,
                    "Revocation refused: credential did not verify"
                );
                return Ok(false);
            }
        };

        audit_event!(
            "consent_revoked",
            subject = %truncate_hash(&context.hashed_subject_id),
            session_id = %context.session_id,
            consent_flag = %flag,
            "Consent revoked; session ended"
        );

        Ok(true)
    }

    pub fn has_required_consent(&self, context: &ConsentContext) -> bool {
        context.consent.has_minimum_consent()
    }

    /// Check a named operation against the context's consent snapshot.
    pub fn check_operation_consent(&self, context: &ConsentContext, operation: &str) -> Result<bool> {
        let operation: Operation = operation.parse()?;
        Ok(context.consent.permits(operation))
    }

    /// Log-safe summary of a credential. The signature is checked; expiry is
    /// reported rather than enforced.
    pub fn audit_info(&self, token: &str) -> Result<AuditInfo> {
        let claims = self.decode_claims(token)?;
        let expired = self.clock.now().timestamp() >= claims.exp;
        let subject_prefix = truncate_hash(&claims.sub).to_string();
        let granted_flags = claims.consent.granted_count();
        let context = Self::context_from_claims(claims)?;

        Ok(AuditInfo {
            subject_prefix,
            session_id: context.session_id,
            issued_at: context.issued_at,
            expires_at: context.expires_at,
            granted_flags,
            expired,
        })
    }

    /// Constant-time comparison of a raw subject id against the credential.
    pub fn subject_matches(&self, context: &ConsentContext, subject_id: &str) -> bool {
        let candidate = self.hash_subject(subject_id);
        candidate
            .as_bytes()
            .ct_eq(context.hashed_subject_id.as_bytes())
            .into()
    }

    /// Lowercase hex SHA-256 of salt ‖ subject id (64 characters).
    pub fn hash_subject(&self, subject_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.subject_salt.expose_secret().as_bytes());
        hasher.update(subject_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn sign(
        &self,
        hashed_subject_id: String,
        session_id: Uuid,
        consent: ConsentGrant,
    ) -> Result<SessionCredential> {
        let iat = self.clock.now().timestamp();
        let exp = iat.saturating_add(self.token_ttl_secs);

        let claims = SessionClaims {
            sub: hashed_subject_id,
            sid: session_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            iat,
            exp,
            consent,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(SessionCredential {
            token,
            session_id,
            expires_at: timestamp_to_datetime(exp)?,
        })
    }

    fn decode_claims(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        // Window checks are done against the injected clock
        validation.validate_exp = false;
        validation.validate_nbf = false;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::InvalidSignature => "signature mismatch",
                    ErrorKind::InvalidIssuer => "unexpected issuer",
                    ErrorKind::InvalidAlgorithm => "unexpected algorithm",
                    ErrorKind::MissingRequiredClaim(_) => "missing required claim",
                    ErrorKind::Json(_) => "malformed claims",
                    _ => "malformed token",
                };
                tracing::debug!(reason, "Credential rejected");
                AuthError::TokenInvalid(reason.to_string())
            })
    }

    fn context_from_claims(claims: SessionClaims) -> Result<ConsentContext> {
        let session_id = Uuid::parse_str(&claims.sid)
            .map_err(|_| AuthError::TokenInvalid("malformed session id".to_string()))?;

        Ok(ConsentContext {
            hashed_subject_id: claims.sub,
            session_id,
            token_id: claims.jti,
            consent: claims.consent,
            issued_at: timestamp_to_datetime(claims.iat)?,
            expires_at: timestamp_to_datetime(claims.exp)?,
        })
    }
}

fn timestamp_to_datetime(secs: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| AuthError::TokenInvalid("timestamp out of range".to_string()))
}
