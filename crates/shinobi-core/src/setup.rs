// ── Setup flow ──
//
// Validates user-entered connection details by fetching the monitor list
// once, and turns any failure into one of three stable error codes the
// form layer can localise.

use std::collections::BTreeMap;

use secrecy::SecretString;
use serde::Deserialize;
use shinobi_api::{ErrorKind, StreamType};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::ConnectionConfig;

/// Title of every entry the flow creates.
pub const TITLE: &str = "Shinobi Video";

/// Message fragments that mark an auth failure regardless of transport.
const AUTH_MARKERS: [&str; 3] = ["Unauthorized", "Invalid", "Access denied"];

/// Values collected by the user step.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub url: String,
    pub api_key: SecretString,
    pub group_key: String,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    #[serde(default)]
    pub stream_type: StreamType,
}

fn default_verify_ssl() -> bool {
    true
}

impl UserInput {
    pub fn new(url: impl Into<String>, api_key: SecretString, group_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key,
            group_key: group_key.into(),
            verify_ssl: true,
            stream_type: StreamType::default(),
        }
    }

    pub fn to_connection_config(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(&*self.url, self.api_key.clone(), &*self.group_key);
        config.verify_tls = self.verify_ssl;
        config.stream_type = self.stream_type;
        config
    }
}

/// Failure buckets surfaced to the user.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    #[error("Failed to connect")]
    CannotConnect,
    #[error("Invalid authentication")]
    InvalidAuth,
    #[error("Unexpected error")]
    Unknown,
}

impl SetupError {
    /// Stable form error code.
    pub fn code(self) -> &'static str {
        match self {
            Self::CannotConnect => "cannot_connect",
            Self::InvalidAuth => "invalid_auth",
            Self::Unknown => "unknown",
        }
    }

    /// Bucket a client error. Authorization failures, and remote failures
    /// whose message reads like one, are `InvalidAuth`; other remote
    /// failures are `CannotConnect`; local errors are `Unknown`.
    pub fn classify(err: &shinobi_api::Error) -> Self {
        match err.kind() {
            ErrorKind::Authorization => Self::InvalidAuth,
            ErrorKind::Connection | ErrorKind::Protocol => {
                let message = err.to_string();
                if AUTH_MARKERS.iter().any(|m| message.contains(m)) {
                    Self::InvalidAuth
                } else {
                    Self::CannotConnect
                }
            }
            ErrorKind::Other => Self::Unknown,
        }
    }
}

/// Data returned by a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupInfo {
    pub title: String,
    pub monitor_count: usize,
}

/// Check the input against the live NVR.
pub async fn validate_input(input: &UserInput) -> Result<SetupInfo, SetupError> {
    let client = match input.to_connection_config().build_client() {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "cannot build client from setup input");
            return Err(SetupError::Unknown);
        }
    };

    match client.list_monitors().await {
        Ok(monitors) => {
            info!(monitors = monitors.len(), "connected to Shinobi");
            Ok(SetupInfo {
                title: TITLE.to_owned(),
                monitor_count: monitors.len(),
            })
        }
        Err(e) => {
            let bucket = SetupError::classify(&e);
            warn!(error = %e, code = bucket.code(), "setup validation failed");
            Err(bucket)
        }
    }
}

/// Result of one flow step.
#[derive(Debug, Clone)]
pub enum FlowResult {
    /// Show (or re-show) the form. `errors` maps `"base"` to an error code.
    ShowForm {
        step_id: &'static str,
        errors: BTreeMap<String, String>,
    },
    /// Validation passed; persist `data` under `title`.
    CreateEntry { title: String, data: UserInput },
}

/// Single-step user flow.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigFlow;

impl ConfigFlow {
    pub const VERSION: u32 = 1;
    pub const STEP_USER: &'static str = "user";

    pub fn new() -> Self {
        Self
    }

    /// With no input, show an empty form. With input, validate it and
    /// either create the entry or re-show the form with one error.
    pub async fn step_user(&self, input: Option<UserInput>) -> FlowResult {
        let Some(input) = input else {
            return FlowResult::ShowForm {
                step_id: Self::STEP_USER,
                errors: BTreeMap::new(),
            };
        };

        match validate_input(&input).await {
            Ok(info) => FlowResult::CreateEntry {
                title: info.title,
                data: input,
            },
            Err(e) => FlowResult::ShowForm {
                step_id: Self::STEP_USER,
                errors: BTreeMap::from([("base".to_owned(), e.code().to_owned())]),
            },
        }
    }
}
