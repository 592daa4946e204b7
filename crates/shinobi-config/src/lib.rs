//! Shared configuration for Shinobi tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `shinobi_core::ConnectionConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shinobi_core::{ConnectionConfig, StreamType};

/// Keyring service name; entries are `{profile}/api-key`.
pub const KEYRING_SERVICE: &str = "shinobi";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named NVR profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_true")]
    pub verify_ssl: bool,

    #[serde(default)]
    pub stream_type: StreamType,

    /// Request timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Poll interval, seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            verify_ssl: true,
            stream_type: StreamType::default(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    30
}

/// A named NVR profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// NVR base URL (e.g. "http://192.168.1.20:8080").
    pub url: String,

    /// Group key the API key belongs to.
    pub group_key: String,

    /// API key (plaintext, prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_ssl: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<StreamType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "shinobi", "shinobi").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("shinobi");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. Layers: built-in defaults, then the TOML
/// file (if present), then `SHINOBI_`-prefixed env vars (`__` nests, e.g.
/// `SHINOBI_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SHINOBI_").split("__"));

    Ok(figment.extract()?)
}

/// Load the config at `path`, let `edit` change it, and write it back.
///
/// A file that fails to parse is returned as an error before `edit` runs
/// and is never rewritten. A missing file starts from the defaults.
pub fn update_config_at<T, E>(
    path: &Path,
    edit: impl FnOnce(&mut Config) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<ConfigError>,
{
    let mut cfg = load_config_from(path)?;
    let out = edit(&mut cfg)?;
    save_config_to(&cfg, path)?;
    Ok(out)
}

/// [`update_config_at`] on the canonical config path.
pub fn update_config<T, E>(edit: impl FnOnce(&mut Config) -> Result<T, E>) -> Result<T, E>
where
    E: From<ConfigError>,
{
    update_config_at(&config_path(), edit)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve an API key: profile's env var, then keyring, then plaintext.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

pub fn keyring_entry(profile_name: &str) -> keyring::Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))
}

/// Build a `ConnectionConfig` from a profile, with `defaults` filling
/// every field the profile leaves unset.
pub fn profile_to_connection_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConnectionConfig, ConfigError> {
    validate_profile(profile, profile_name)?;
    let api_key = resolve_api_key(profile, profile_name)?;
    connection_config_with_key(profile, profile_name, api_key, defaults)
}

/// Same as [`profile_to_connection_config`], with the API key supplied by
/// the caller instead of the credential chain.
pub fn connection_config_with_key(
    profile: &Profile,
    profile_name: &str,
    api_key: SecretString,
    defaults: &Defaults,
) -> Result<ConnectionConfig, ConfigError> {
    validate_profile(profile, profile_name)?;
    if api_key.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "api_key".into(),
            reason: format!("profile '{profile_name}' has an empty API key"),
        });
    }

    let mut cfg = ConnectionConfig::new(profile.url.clone(), api_key, profile.group_key.clone());
    cfg.verify_tls = profile.verify_ssl.unwrap_or(defaults.verify_ssl);
    cfg.stream_type = profile.stream_type.unwrap_or(defaults.stream_type);
    cfg.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    cfg.poll_interval =
        Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval));
    Ok(cfg)
}

fn validate_profile(profile: &Profile, profile_name: &str) -> Result<(), ConfigError> {
    if profile.url.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("profile '{profile_name}' has no NVR URL"),
        });
    }
    if profile.group_key.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "group_key".into(),
            reason: format!("profile '{profile_name}' has no group key"),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile() -> Profile {
        Profile {
            url: "http://nvr:8080".into(),
            group_key: "GROUP".into(),
            api_key: Some("plain".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.defaults.poll_interval, 30);
        assert!(cfg.defaults.verify_ssl);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        let mut p = profile();
        p.stream_type = Some(StreamType::Mjpeg);
        cfg.profiles.insert("home".into(), p);
        cfg.default_profile = Some("home".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("home"));
        let home = &loaded.profiles["home"];
        assert_eq!(home.url, "http://nvr:8080");
        assert_eq!(home.stream_type, Some(StreamType::Mjpeg));
        assert_eq!(home.api_key.as_deref(), Some("plain"));
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[defaults]
timeout = 4
verify_ssl = false

[profiles.lab]
url = "nvr.lab:8080"
group_key = "G"
api_key_env = "LAB_SHINOBI_KEY"
poll_interval = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.timeout, 4);
        assert!(!cfg.defaults.verify_ssl);
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.profiles["lab"].poll_interval, Some(5));
    }

    #[test]
    fn profile_values_win_over_defaults() {
        let defaults = Defaults {
            timeout: 4,
            verify_ssl: false,
            ..Defaults::default()
        };
        let mut p = profile();
        p.verify_ssl = Some(true);
        p.poll_interval = Some(0);

        let cfg = profile_to_connection_config(&p, "unit-test-profile", &defaults).unwrap();
        assert_eq!(cfg.url, "http://nvr:8080");
        assert_eq!(cfg.group_key, "GROUP");
        assert!(cfg.verify_tls);
        assert_eq!(cfg.timeout, Duration::from_secs(4));
        assert_eq!(cfg.poll_interval, Duration::ZERO);
        assert_eq!(cfg.stream_type, StreamType::Hls);
    }

    #[test]
    fn api_key_env_var_is_preferred() {
        // PATH is always set, so it stands in for a key variable.
        let mut p = profile();
        p.api_key_env = Some("PATH".into());
        let key = resolve_api_key(&p, "unit-test-profile").unwrap();
        assert_eq!(key.expose_secret(), std::env::var("PATH").unwrap());
    }

    #[test]
    fn missing_group_key_is_rejected() {
        let mut p = profile();
        p.group_key = String::new();
        let err = profile_to_connection_config(&p, "x", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "group_key"));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = connection_config_with_key(
            &profile(),
            "x",
            SecretString::from(String::new()),
            &Defaults::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_key"));
    }

    #[test]
    fn malformed_file_is_never_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let original = "[profiles.lab]\nurl = \"http://lab\"\ngroup_key = \"g\"\ntimeout = \"oops\"\n";
        std::fs::write(&path, original).unwrap();

        let mut edited = false;
        let result: Result<(), ConfigError> = update_config_at(&path, |cfg| {
            edited = true;
            cfg.default_profile = Some("other".into());
            Ok(())
        });

        assert!(matches!(result, Err(ConfigError::Figment(_))));
        assert!(!edited);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn update_keeps_existing_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), profile());
        save_config_to(&cfg, &path).unwrap();

        update_config_at(&path, |cfg| -> Result<(), ConfigError> {
            cfg.default_profile = Some("lab".into());
            Ok(())
        })
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("lab"));
        assert_eq!(loaded.profiles["lab"].url, "http://nvr:8080");
    }
}
