// Wire types for the Shinobi monitor API.
//
// Only the handful of fields the bridge reads are typed; everything else
// the NVR sends is preserved verbatim in `Monitor::extra`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Monitor identifier (`mid`).
///
/// Shinobi hands these out as short strings, but hand-edited monitor
/// configs and some mock servers use bare numbers -- both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MonitorId(String);

impl MonitorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MonitorId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for MonitorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for MonitorId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => Self(s),
            Raw::Num(n) => Self(n.to_string()),
        })
    }
}

/// Desired operating state of a monitor, as accepted by the mode endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MonitorMode {
    Record,
    Watch,
    Stop,
    Start,
}

/// One monitor record from `GET /{api_key}/monitor/{group_key}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    pub mid: MonitorId,
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: String,
    /// NVR-reported activity (`recording`, `watching`, ...).
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    /// Desired mode (`record`, `watch`, `stop`, `start`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub mode: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub monitor_type: Option<String>,
    /// Stream paths, usually root-relative (`/{api_key}/hls/...`).
    #[serde(default, deserialize_with = "lenient_streams")]
    pub streams: Vec<String>,
    /// Group key the monitor belongs to.
    #[serde(default, deserialize_with = "lenient_string")]
    pub ke: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Monitor {
    /// Display name, falling back to the id for unnamed monitors.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.mid.as_str()
        } else {
            &self.name
        }
    }

    /// Parsed mode, if the NVR reported one we recognise.
    pub fn parsed_mode(&self) -> Option<MonitorMode> {
        self.mode.as_deref().and_then(|m| m.parse().ok())
    }

    /// `true` when the NVR reports the monitor as actively recording.
    pub fn is_recording(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("recording"))
    }

    /// `true` when the monitor's mode is `record`.
    pub fn is_record_mode(&self) -> bool {
        self.parsed_mode() == Some(MonitorMode::Record)
    }

    pub fn first_stream(&self) -> Option<&str> {
        self.streams.first().map(String::as_str)
    }
}

/// Text fields arrive as `null` on half-configured monitors. Anything but
/// a string reads as absent so one odd record cannot sink the list.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    lenient_string(deserializer).map(Option::unwrap_or_default)
}

/// `streams` is sometimes absent, `null`, or a non-list; treat all of
/// those as "no streams" rather than failing the whole monitor list.
fn lenient_streams<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
