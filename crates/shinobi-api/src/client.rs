// Shinobi HTTP client
//
// Wraps `reqwest::Client` with Shinobi's key-in-path URL scheme. Every
// endpoint is `{base}/{api_key}/{verb}/{group_key}/...`; the API key is
// redacted from anything we log.

use bytes::Bytes;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use crate::error::Error;
use crate::models::{Monitor, MonitorId, MonitorMode};
use crate::transport::TransportConfig;

/// Which live stream flavour a camera should advertise.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StreamType {
    #[default]
    Hls,
    Mjpeg,
}

/// HTTP client for one Shinobi NVR and one API key / group key pair.
///
/// Holds no state beyond its connection parameters; cheap to share behind
/// an `Arc`.
pub struct ShinobiClient {
    http: reqwest::Client,
    /// Normalised base URL: always has a scheme, never a trailing slash.
    base_url: String,
    api_key: SecretString,
    group_key: String,
    timeout_secs: u64,
}

impl ShinobiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `url` may omit the scheme (`nvr.local:8080` becomes
    /// `http://nvr.local:8080`).
    pub fn new(
        url: &str,
        api_key: SecretString,
        group_key: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, url, api_key, group_key)?;
        client.timeout_secs = transport.timeout.as_secs();
        Ok(client)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        url: &str,
        api_key: SecretString,
        group_key: impl Into<String>,
    ) -> Result<Self, Error> {
        let base_url = normalize_base_url(url)?;
        Ok(Self {
            http,
            base_url,
            api_key,
            group_key: group_key.into(),
            timeout_secs: TransportConfig::default().timeout.as_secs(),
        })
    }

    /// The normalised NVR base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn endpoint(&self, verb: &str) -> String {
        format!(
            "{}/{}/{verb}/{}",
            self.base_url,
            self.api_key.expose_secret(),
            self.group_key
        )
    }

    /// `{base}/{api_key}/monitor/{group_key}`
    pub fn monitors_url(&self) -> String {
        self.endpoint("monitor")
    }

    /// `{base}/{api_key}/jpeg/{group_key}/{mid}/s.jpg`
    pub fn snapshot_url(&self, monitor_id: &MonitorId) -> String {
        format!("{}/{monitor_id}/s.jpg", self.endpoint("jpeg"))
    }

    /// `{base}/{api_key}/mjpeg/{group_key}/{mid}`
    pub fn mjpeg_url(&self, monitor_id: &MonitorId) -> String {
        format!("{}/{monitor_id}", self.endpoint("mjpeg"))
    }

    /// `{base}/{api_key}/hls/{group_key}/{mid}/index.m3u8`
    pub fn hls_url(&self, monitor_id: &MonitorId) -> String {
        format!("{}/{monitor_id}/index.m3u8", self.endpoint("hls"))
    }

    /// `{base}/{api_key}/monitor/{group_key}/{mid}/{mode}`
    pub fn mode_url(&self, monitor_id: &MonitorId, mode: MonitorMode) -> String {
        format!("{}/{monitor_id}/{mode}", self.monitors_url())
    }

    /// Resolve the stream URL for a monitor.
    ///
    /// An absolute `preferred` URL is returned as-is, a root-relative one is
    /// joined onto the base URL, and anything else falls back to the HLS
    /// template.
    pub fn stream_url(&self, monitor_id: &MonitorId, preferred: Option<&str>) -> String {
        match preferred {
            Some(p) if is_absolute_url(p) => p.to_owned(),
            Some(p) if p.starts_with('/') => format!("{}{p}", self.base_url),
            _ => self.hls_url(monitor_id),
        }
    }

    /// Stream URL for the given stream flavour.
    pub fn stream_url_for(
        &self,
        monitor_id: &MonitorId,
        stream_type: StreamType,
        preferred: Option<&str>,
    ) -> String {
        match stream_type {
            StreamType::Hls => self.stream_url(monitor_id, preferred),
            StreamType::Mjpeg => self.mjpeg_url(monitor_id),
        }
    }

    /// Replace the API key in a URL before it reaches a log line.
    fn redact(&self, url: &str) -> String {
        let key = self.api_key.expose_secret();
        if key.is_empty() {
            return url.to_owned();
        }
        url.replace(key, "***")
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Fetch the monitor list for the configured group.
    ///
    /// A JSON body that is not an array yields an empty list rather than an
    /// error; a `{"success": false}` body is an authorization failure.
    pub async fn list_monitors(&self) -> Result<Vec<Monitor>, Error> {
        let url = self.monitors_url();
        debug!("GET {}", self.redact(&url));

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Authorization {
                message: "Invalid API Key or Group Key (Unauthorized)".into(),
            });
        }

        if status == StatusCode::FORBIDDEN {
            return Err(Error::Authorization {
                message: "Access denied (Forbidden). Check API Key restrictions.".into(),
            });
        }

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        parse_monitor_list(&body)
    }

    /// Fetch a still JPEG for a monitor.
    ///
    /// Returns `None` on any non-200 status or transport failure; a missed
    /// frame is logged, never raised.
    pub async fn fetch_snapshot(&self, monitor_id: &MonitorId) -> Option<Bytes> {
        let url = self.snapshot_url(monitor_id);
        debug!("GET {}", self.redact(&url));

        match self.http.get(&url).send().await {
            Ok(resp) if resp.status() == StatusCode::OK => match resp.bytes().await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    error!(monitor = %monitor_id, error = %e.without_url(), "error reading camera image");
                    None
                }
            },
            Ok(resp) => {
                debug!(monitor = %monitor_id, status = %resp.status(), "no camera image");
                None
            }
            Err(e) => {
                error!(monitor = %monitor_id, error = %e.without_url(), "error fetching camera image");
                None
            }
        }
    }

    /// Change a monitor's mode. Returns `true` only on HTTP 200.
    pub async fn set_mode(&self, monitor_id: &MonitorId, mode: MonitorMode) -> bool {
        let url = self.mode_url(monitor_id, mode);
        debug!("GET {}", self.redact(&url));

        match self.http.get(&url).send().await {
            Ok(resp) if resp.status() == StatusCode::OK => true,
            Ok(resp) => {
                error!(monitor = %monitor_id, %mode, status = %resp.status(), "error changing mode");
                false
            }
            Err(e) => {
                error!(monitor = %monitor_id, %mode, error = %e.without_url(), "error changing mode");
                false
            }
        }
    }

    /// `true` if the monitor list can be fetched with these credentials.
    pub async fn test_connection(&self) -> bool {
        match self.list_monitors().await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "failed to connect to Shinobi");
                false
            }
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            warn!(url = %self.base_url, "timeout connecting to Shinobi");
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err.without_url())
        }
    }
}

/// Decode a monitor-list body.
fn parse_monitor_list(body: &str) -> Result<Vec<Monitor>, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| protocol_error(&e, body))?;

    // Shinobi reports bad keys as `{"success": false, "msg": "..."}` with HTTP 200.
    if value.get("success") == Some(&Value::Bool(false)) {
        let message = value
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("Unauthorized")
            .to_owned();
        warn!(%message, "Shinobi API error");
        return Err(Error::Authorization { message });
    }

    if !value.is_array() {
        debug!(?value, "monitor list is not an array, treating as empty");
        return Ok(Vec::new());
    }

    serde_json::from_value(value).map_err(|e| Error::Protocol {
        message: format!("Malformed monitor record in response: {e}"),
        body: body.to_owned(),
    })
}

fn protocol_error(err: &serde_json::Error, body: &str) -> Error {
    let preview: String = body.chars().take(100).collect();
    Error::Protocol {
        message: format!(
            "Server did not return valid JSON ({err}, body preview: {preview:?}). Check the URL."
        ),
        body: body.to_owned(),
    }
}

fn normalize_base_url(url: &str) -> Result<String, Error> {
    let url = url.trim();
    let with_scheme = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_owned()
    } else {
        format!("http://{url}")
    };
    // Validate only; the string form is what the URL builders use.
    Url::parse(&with_scheme)?;
    Ok(with_scheme.trim_end_matches('/').to_owned())
}

fn is_absolute_url(s: &str) -> bool {
    Url::parse(s).is_ok_and(|u| u.has_host())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(url: &str) -> ShinobiClient {
        ShinobiClient::with_client(
            reqwest::Client::new(),
            url,
            SecretString::from("KEY".to_string()),
            "GROUP",
        )
        .unwrap()
    }

    #[test]
    fn base_url_gets_scheme_and_loses_trailing_slash() {
        assert_eq!(client("nvr.local:8080/").base_url(), "http://nvr.local:8080");
        assert_eq!(client("https://nvr.local//").base_url(), "https://nvr.local");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = ShinobiClient::with_client(
            reqwest::Client::new(),
            "http://",
            SecretString::from("KEY".to_string()),
            "GROUP",
        );
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn templated_urls() {
        let c = client("http://nvr:8080");
        let mid = MonitorId::from("5");
        assert_eq!(c.monitors_url(), "http://nvr:8080/KEY/monitor/GROUP");
        assert_eq!(c.snapshot_url(&mid), "http://nvr:8080/KEY/jpeg/GROUP/5/s.jpg");
        assert_eq!(c.mjpeg_url(&mid), "http://nvr:8080/KEY/mjpeg/GROUP/5");
        assert_eq!(
            c.stream_url(&mid, None),
            "http://nvr:8080/KEY/hls/GROUP/5/index.m3u8"
        );
        assert_eq!(
            c.mode_url(&mid, MonitorMode::Watch),
            "http://nvr:8080/KEY/monitor/GROUP/5/watch"
        );
    }

    #[test]
    fn preferred_stream_wins() {
        let c = client("http://nvr:8080");
        let mid = MonitorId::from("5");
        assert_eq!(
            c.stream_url(&mid, Some("/custom/path.m3u8")),
            "http://nvr:8080/custom/path.m3u8"
        );
        assert_eq!(
            c.stream_url(&mid, Some("https://x/y.m3u8")),
            "https://x/y.m3u8"
        );
        // Neither absolute nor root-relative: template wins.
        assert_eq!(
            c.stream_url(&mid, Some("s.m3u8")),
            "http://nvr:8080/KEY/hls/GROUP/5/index.m3u8"
        );
    }

    #[test]
    fn mjpeg_stream_type_ignores_preferred() {
        let c = client("http://nvr:8080");
        let mid = MonitorId::from("5");
        assert_eq!(
            c.stream_url_for(&mid, StreamType::Mjpeg, Some("/custom/path.m3u8")),
            "http://nvr:8080/KEY/mjpeg/GROUP/5"
        );
    }

    #[test]
    fn redact_hides_api_key() {
        let c = client("http://nvr:8080");
        assert_eq!(c.redact(&c.monitors_url()), "http://nvr:8080/***/monitor/GROUP");
    }

    #[test]
    fn redact_with_empty_key_leaves_url_intact() {
        let c = ShinobiClient::with_client(
            reqwest::Client::new(),
            "http://nvr:8080",
            SecretString::from(String::new()),
            "GROUP",
        )
        .unwrap();
        let url = "http://nvr:8080/monitor/GROUP";
        assert_eq!(c.redact(url), url);
    }

    #[test]
    fn parse_success_false_is_authorization() {
        let err = parse_monitor_list(r#"{"success": false, "msg": "x"}"#).unwrap_err();
        assert!(matches!(err, Error::Authorization { ref message } if message == "x"));

        let err = parse_monitor_list(r#"{"success": false}"#).unwrap_err();
        assert!(matches!(err, Error::Authorization { ref message } if message == "Unauthorized"));
    }

    #[test]
    fn parse_non_array_is_empty() {
        assert!(parse_monitor_list("{}").unwrap().is_empty());
        assert!(parse_monitor_list(r#"{"success": true}"#).unwrap().is_empty());
    }

    #[test]
    fn parse_garbage_is_protocol_error() {
        let err = parse_monitor_list("<html>Login</html>").unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));

        let err = parse_monitor_list(r#"[{"name": "no id"}]"#).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
        assert!(err.to_string().contains("Malformed monitor record"), "{err}");
    }

    #[test]
    fn stream_type_parses_case_insensitively() {
        assert_eq!("HLS".parse::<StreamType>().unwrap(), StreamType::Hls);
        assert_eq!(StreamType::Mjpeg.to_string(), "mjpeg");
        assert_eq!(StreamType::default(), StreamType::Hls);
    }
}
