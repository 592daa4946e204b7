// ── Runtime connection configuration ──
//
// These types describe *how* to reach one Shinobi NVR. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `ConnectionConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use shinobi_api::{ShinobiClient, StreamType, TransportConfig};

use crate::error::CoreError;

/// How often the coordinator polls the monitor list.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for one NVR connection (one API key / group key pair).
///
/// Immutable once a client is built from it.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// NVR base URL (e.g. `http://192.168.1.20:8080`). A missing scheme
    /// defaults to `http://`.
    pub url: String,
    pub api_key: SecretString,
    pub group_key: String,
    pub verify_tls: bool,
    /// Stream flavour cameras advertise.
    pub stream_type: StreamType,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Poll interval. `Duration::ZERO` disables periodic polling.
    pub poll_interval: Duration,
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>, api_key: SecretString, group_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key,
            group_key: group_key.into(),
            verify_tls: true,
            stream_type: StreamType::default(),
            timeout: shinobi_api::DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_verify_tls(self.verify_tls)
            .with_timeout(self.timeout)
    }

    pub fn build_client(&self) -> Result<ShinobiClient, CoreError> {
        Ok(ShinobiClient::new(
            &self.url,
            self.api_key.clone(),
            self.group_key.clone(),
            &self.transport(),
        )?)
    }
}
