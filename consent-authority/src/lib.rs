//! Consent-scoped session credentials
//!
//! The token authority issues short-lived HS256 credentials that carry a
//! salted, one-way hash of the subject identifier and an immutable snapshot
//! of the subject's consent. Every pipeline call re-verifies its credential.
//!
//! - **Issue**: refused unless recording, transcription and AI processing
//!   consent are all granted
//! - **Verify**: signature, issuer and `[iat - leeway, exp + leeway)` window
//! - **Refresh**: only inside the final refresh window; consent carries over
//! - **Revoke**: audited here, enforced by the orchestrator's session state
//!
//! ```rust
//! use consent_authority::{AuthorityConfig, ConsentGrant, TokenAuthority};
//!
//! let authority = TokenAuthority::new(AuthorityConfig::default()).unwrap();
//! let credential = authority.issue("patient-0042", ConsentGrant::minimum()).unwrap();
//! let context = authority.verify(&credential.token).unwrap();
//! assert!(authority.has_required_consent(&context));
//! assert!(!authority.check_operation_consent(&context, "store_data").unwrap());
//! ```

pub mod authority;
pub mod clock;
pub mod config;
pub mod consent;
pub mod error;
pub mod models;

pub use authority::TokenAuthority;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::*;
pub use consent::{ConsentFlag, ConsentGrant, Operation};
pub use error::{AuthError, Result};
pub use models::*;
