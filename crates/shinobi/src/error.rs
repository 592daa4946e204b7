//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` / `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use shinobi_config::ConfigError;
use shinobi_core::{CoreError, ErrorKind, SetupError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the NVR")]
    #[diagnostic(
        code(shinobi::connection_failed),
        help(
            "Check that Shinobi is running and reachable.\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Unexpected response from the NVR: {message}")]
    #[diagnostic(
        code(shinobi::protocol),
        help("The URL may point at something other than the Shinobi API.")
    )]
    Protocol { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(shinobi::auth_failed),
        help(
            "Verify the API key and group key (Shinobi > API).\n\
             Run: shinobi config set-api-key --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(shinobi::no_credentials),
        help(
            "Configure credentials with: shinobi config init\n\
             Or pass --api-key / set SHINOBI_API_KEY."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Monitor '{identifier}' not found")]
    #[diagnostic(
        code(shinobi::not_found),
        help("Run: shinobi monitors list to see available monitors")
    )]
    MonitorNotFound { identifier: String },

    // ── Writes ───────────────────────────────────────────────────────
    #[error("NVR rejected mode '{mode}' for monitor '{monitor}'")]
    #[diagnostic(
        code(shinobi::mode_rejected),
        help("Run with -v for the NVR's response status.")
    )]
    ModeRejected { monitor: String, mode: String },

    #[error("No image returned for monitor '{monitor}'")]
    #[diagnostic(code(shinobi::no_image))]
    NoImage { monitor: String },

    // ── Setup validation ─────────────────────────────────────────────
    #[error("Connection test failed: {code}")]
    #[diagnostic(code(shinobi::setup))]
    Setup {
        code: &'static str,
        #[source]
        source: SetupError,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(shinobi::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(shinobi::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: shinobi config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No NVR configured")]
    #[diagnostic(
        code(shinobi::no_config),
        help(
            "Create a profile with: shinobi config init\n\
             Or pass --url, --api-key and --group-key.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(shinobi::config))]
    Config(#[from] ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(shinobi::timeout),
        help("Increase the timeout with --timeout or check NVR responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Protocol { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::MonitorNotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            Self::Setup { source, .. } => match source {
                SetupError::InvalidAuth => exit_code::AUTH,
                SetupError::CannotConnect => exit_code::CONNECTION,
                SetupError::Unknown => exit_code::GENERAL,
            },
            Self::Config(ConfigError::NoCredentials { .. }) => exit_code::AUTH,
            Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<SetupError> for CliError {
    fn from(err: SetupError) -> Self {
        Self::Setup {
            code: err.code(),
            source: err,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message,
                profile: "current".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Protocol { message } => CliError::Protocol { message },

            CoreError::UpdateFailed { message, kind } => match kind {
                ErrorKind::Authorization => CliError::AuthFailed {
                    message,
                    profile: "current".into(),
                },
                ErrorKind::Protocol => CliError::Protocol { message },
                ErrorKind::Connection | ErrorKind::Other => {
                    CliError::ConnectionFailed { reason: message }
                }
            },

            CoreError::MonitorNotFound { identifier } => CliError::MonitorNotFound { identifier },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::AuthenticationFailed {
                    message: "x".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::ConnectionFailed { reason: "x".into() },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 3 }, exit_code::TIMEOUT),
            (
                CoreError::MonitorNotFound {
                    identifier: "m".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::UpdateFailed {
                    message: "x".into(),
                    kind: ErrorKind::Authorization,
                },
                exit_code::AUTH,
            ),
        ];

        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn setup_buckets_map_to_exit_codes() {
        assert_eq!(CliError::from(SetupError::InvalidAuth).exit_code(), exit_code::AUTH);
        assert_eq!(
            CliError::from(SetupError::CannotConnect).exit_code(),
            exit_code::CONNECTION
        );
        assert_eq!(CliError::from(SetupError::Unknown).exit_code(), exit_code::GENERAL);
    }
}
