// Logging macros

/// Emit a structured audit event on the `audit` target.
///
/// Fields must already be PHI-free: hash prefixes, session ids and counts.
///
/// ```rust
/// use logger_redacted::audit_event;
///
/// audit_event!("credential_issued", subject = "3f2a9c1d", granted_flags = 3, "Credential issued");
/// ```
#[macro_export]
macro_rules! audit_event {
    ($event:expr, $($rest:tt)+) => {
        $crate::__tracing::info!(target: "audit", event = $event, $($rest)+)
    };
}
