//! CLI configuration: thin wrapper around `shinobi_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--url, --api-key, --group-key, ...).

use std::time::Duration;

use secrecy::SecretString;

use shinobi_core::{ConnectionConfig, StreamType};

use crate::cli::{GlobalOpts, StreamTypeArg};
use crate::error::CliError;

pub use shinobi_config::{
    Config, Defaults, Profile, config_path, load_config, update_config,
};

impl From<StreamTypeArg> for StreamType {
    fn from(arg: StreamTypeArg) -> Self {
        match arg {
            StreamTypeArg::Hls => StreamType::Hls,
            StreamTypeArg::Mjpeg => StreamType::Mjpeg,
        }
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ConnectionConfig` from config file, profile and flags.
///
/// Flags win over profile values, which win over `[defaults]`. With no
/// matching profile, `--url`, `--api-key` and `--group-key` must all be
/// given.
pub fn build_connection_config(global: &GlobalOpts) -> Result<ConnectionConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let mut conn = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile_config(profile, &profile_name, &cfg.defaults, global)?,
        None => {
            if global.profile.is_some() {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(&cfg),
                });
            }
            flags_only_config(global, &profile_name, &cfg.defaults)?
        }
    };

    apply_flag_overrides(&mut conn, global);
    Ok(conn)
}

fn profile_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ConnectionConfig, CliError> {
    let mut profile = profile.clone();
    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if let Some(ref group_key) = global.group_key {
        profile.group_key.clone_from(group_key);
    }

    // A flag-supplied key skips the env/keyring/plaintext chain.
    let conn = match global.api_key {
        Some(ref key) => shinobi_config::connection_config_with_key(
            &profile,
            profile_name,
            SecretString::from(key.clone()),
            defaults,
        )?,
        None => shinobi_config::profile_to_connection_config(&profile, profile_name, defaults)?,
    };
    Ok(conn)
}

fn flags_only_config(
    global: &GlobalOpts,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConnectionConfig, CliError> {
    let url = global.url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let api_key = global
        .api_key
        .clone()
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.into(),
        })?;
    if api_key.trim().is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }
    let group_key = global.group_key.clone().ok_or_else(|| CliError::Validation {
        field: "group_key".into(),
        reason: "pass --group-key or set SHINOBI_GROUP_KEY".into(),
    })?;

    let mut conn = ConnectionConfig::new(url, SecretString::from(api_key), group_key);
    conn.verify_tls = defaults.verify_ssl;
    conn.stream_type = defaults.stream_type;
    conn.timeout = Duration::from_secs(defaults.timeout);
    conn.poll_interval = Duration::from_secs(defaults.poll_interval);
    Ok(conn)
}

fn apply_flag_overrides(conn: &mut ConnectionConfig, global: &GlobalOpts) {
    if global.insecure {
        conn.verify_tls = false;
    }
    if let Some(stream_type) = global.stream_type {
        conn.stream_type = stream_type.into();
    }
    if let Some(timeout) = global.timeout {
        conn.timeout = Duration::from_secs(timeout);
    }
    if let Some(interval) = global.interval {
        conn.poll_interval = Duration::from_secs(interval);
    }
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
