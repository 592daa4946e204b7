use thiserror::Error;

/// Coarse classification of [`Error`], used by callers that only need to
/// know *what kind* of thing went wrong (setup validation, CLI exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The NVR could not be reached, timed out, or answered with a
    /// non-success HTTP status.
    Connection,
    /// The NVR rejected the API key / group key pair.
    Authorization,
    /// The NVR answered, but not with the JSON we expected.
    Protocol,
    /// Local failures (bad URL, TLS setup).
    Other,
}

/// Top-level error type for the `shinobi-api` crate.
///
/// Snapshot and mode-change calls never surface these -- they are logged
/// and folded into `None` / `false` at the client boundary.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authorization ───────────────────────────────────────────────
    /// HTTP 401/403, or a `{"success": false, "msg": ...}` body.
    #[error("{message}")]
    Authorization { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("Failed to connect: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Connection timed out after {timeout_secs}s. Check the URL and network.")]
    Timeout { timeout_secs: u64 },

    /// Any non-success status other than 401/403.
    #[error("HTTP {status} from NVR")]
    Http { status: u16 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// Response body was not JSON, or not shaped like a monitor list.
    #[error("{message}")]
    Protocol { message: String, body: String },
}

impl Error {
    /// Classify this error for setup validation and exit codes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::Transport(_) | Self::Timeout { .. } | Self::Http { .. } => ErrorKind::Connection,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::InvalidUrl(_) | Self::Tls(_) => ErrorKind::Other,
        }
    }

    /// Returns `true` if the NVR rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_kind() {
        let err = Error::Authorization {
            message: "Unauthorized".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(err.is_unauthorized());
    }

    #[test]
    fn http_status_is_connection_kind() {
        let err = Error::Http { status: 502 };
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn protocol_kind() {
        let err = Error::Protocol {
            message: "expected value".into(),
            body: "<html>".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.to_string(), "expected value");
    }
}
