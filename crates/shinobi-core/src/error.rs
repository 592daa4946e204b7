// ── Core error types ──
//
// User-facing errors from shinobi-core. Consumers never match on HTTP
// status codes or JSON failures directly; the `From<shinobi_api::Error>`
// impl translates transport-layer errors into domain variants.

use shinobi_api::ErrorKind;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to NVR: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("NVR request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Unexpected response from NVR: {message}")]
    Protocol { message: String },

    // ── Polling ──────────────────────────────────────────────────────
    /// A poll failed; the previous monitor map is still being served.
    #[error("Error communicating with API: {message}")]
    UpdateFailed { message: String, kind: ErrorKind },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Monitor not found: {identifier}")]
    MonitorNotFound { identifier: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The transport-level classification behind this error, if any.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } => ErrorKind::Connection,
            Self::AuthenticationFailed { .. } => ErrorKind::Authorization,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::UpdateFailed { kind, .. } => *kind,
            Self::MonitorNotFound { .. } | Self::Config { .. } => ErrorKind::Other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<shinobi_api::Error> for CoreError {
    fn from(err: shinobi_api::Error) -> Self {
        match err {
            shinobi_api::Error::Authorization { message } => {
                CoreError::AuthenticationFailed { message }
            }
            shinobi_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            shinobi_api::Error::Transport(ref e) if e.is_timeout() => {
                CoreError::Timeout { timeout_secs: 0 }
            }
            e @ (shinobi_api::Error::Transport(_) | shinobi_api::Error::Http { .. }) => {
                CoreError::ConnectionFailed {
                    reason: e.to_string(),
                }
            }
            shinobi_api::Error::Protocol { message, body: _ } => CoreError::Protocol { message },
            shinobi_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            shinobi_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_maps_to_auth_failed() {
        let err: CoreError = shinobi_api::Error::Authorization {
            message: "Unauthorized".into(),
        }
        .into();
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn http_status_maps_to_connection_failed() {
        let err: CoreError = shinobi_api::Error::Http { status: 502 }.into();
        assert!(matches!(err, CoreError::ConnectionFailed { ref reason } if reason.contains("502")));
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[test]
    fn update_failed_keeps_kind() {
        let err = CoreError::UpdateFailed {
            message: "x".into(),
            kind: ErrorKind::Protocol,
        };
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.to_string(), "Error communicating with API: x");
    }
}
