//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};
use secrecy::SecretString;
use serde::Serialize;
use tabled::Tabled;

use shinobi_config::keyring_entry;
use shinobi_core::{ConfigFlow, FlowResult, StreamType, UserInput};

use super::util::prompt_err;
use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const SET_KEYS: &str =
    "url, group_key, api_key, api_key_env, verify_ssl, stream_type, timeout, poll_interval";

fn keyring_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "keyring".into(),
        reason: format!("failed to access keyring: {e}"),
    }
}

fn store_api_key(profile_name: &str, key: &str) -> Result<(), CliError> {
    keyring_entry(profile_name)
        .map_err(keyring_err)?
        .set_password(key)
        .map_err(keyring_err)
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str, hint: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: hint.into(),
    })
}

/// Apply one `config set` assignment to a profile.
fn set_profile_value(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key.replace('-', "_").as_str() {
        "url" => profile.url = value,
        "group_key" => profile.group_key = value,
        "api_key" => profile.api_key = Some(value),
        "api_key_env" => profile.api_key_env = Some(value),
        "verify_ssl" => {
            profile.verify_ssl = Some(parse_value("verify_ssl", &value, "must be 'true' or 'false'")?);
        }
        "stream_type" => {
            profile.stream_type = Some(parse_value("stream_type", &value, "must be 'hls' or 'mjpeg'")?);
        }
        "timeout" => {
            profile.timeout = Some(parse_value("timeout", &value, "must be a number (seconds)")?);
        }
        "poll_interval" => {
            profile.poll_interval =
                Some(parse_value("poll_interval", &value, "must be a number (seconds)")?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {SET_KEYS}"),
            });
        }
    }
    Ok(())
}

/// Copy of the config with plaintext API keys masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some("***".into());
        }
    }
    out
}

#[derive(Serialize, Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Group")]
    group_key: String,
    #[tabled(rename = "Default")]
    default: bool,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init().await,

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config()?);
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|_| format!("{c:#?}")),
                |_| config::config_path().display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let profile_name = config::update_config(|cfg| -> Result<String, CliError> {
                let profile_name = config::active_profile_name(global, cfg);
                let profile = cfg.profiles.entry(profile_name.clone()).or_default();
                set_profile_value(profile, &key, value)?;
                Ok(profile_name)
            })?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: shinobi config init");
                return Ok(());
            }
            let rows: Vec<ProfileRow> = cfg
                .profiles
                .iter()
                .map(|(name, p)| ProfileRow {
                    name: name.clone(),
                    url: p.url.clone(),
                    group_key: p.group_key.clone(),
                    default: name == default,
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &rows,
                |r| ProfileRow {
                    name: r.name.clone(),
                    url: r.url.clone(),
                    group_key: r.group_key.clone(),
                    default: r.default,
                },
                |r| r.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            config::update_config(|cfg| {
                if !cfg.profiles.contains_key(&name) {
                    return Err(CliError::ProfileNotFound {
                        available: config::available_profiles(cfg),
                        name: name.clone(),
                    });
                }
                cfg.default_profile = Some(name.clone());
                Ok(())
            })?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetApiKey => {
            let cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let key = rpassword::prompt_password("API key: ").map_err(prompt_err)?;
            if key.is_empty() {
                return Err(CliError::Validation {
                    field: "api_key".into(),
                    reason: "API key cannot be empty".into(),
                });
            }
            store_api_key(&profile_name, &key)?;
            eprintln!("✓ API key stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

async fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    // An unreadable file stops the wizard before any prompt.
    config::load_config()?;
    eprintln!("Shinobi CLI configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("NVR URL")
        .default("http://192.168.1.20:8080".into())
        .interact_text()
        .map_err(prompt_err)?;

    let group_key: String = Input::new()
        .with_prompt("Group key")
        .interact_text()
        .map_err(prompt_err)?;

    let api_key = rpassword::prompt_password("API key: ").map_err(prompt_err)?;
    if api_key.is_empty() {
        return Err(CliError::Validation {
            field: "api_key".into(),
            reason: "API key cannot be empty".into(),
        });
    }

    let verify_ssl = Confirm::new()
        .with_prompt("Verify TLS certificates?")
        .default(true)
        .interact()
        .map_err(prompt_err)?;

    let stream_choices = &["HLS (recommended)", "MJPEG"];
    let stream_type = match Select::new()
        .with_prompt("Stream type")
        .items(stream_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?
    {
        0 => StreamType::Hls,
        _ => StreamType::Mjpeg,
    };

    // Validate before anything is written.
    let mut input = UserInput::new(url.clone(), SecretString::from(api_key.clone()), group_key.clone());
    input.verify_ssl = verify_ssl;
    input.stream_type = stream_type;
    match ConfigFlow::new().step_user(Some(input)).await {
        FlowResult::CreateEntry { title, .. } => eprintln!("   ✓ Connected to {title}"),
        FlowResult::ShowForm { errors, .. } => {
            let code = errors.get("base").cloned().unwrap_or_else(|| "unknown".into());
            return Err(CliError::Validation {
                field: "connection".into(),
                reason: format!("NVR validation failed ({code})"),
            });
        }
    }

    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let in_keyring = Select::new()
        .with_prompt("Where to store the API key?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?
        == 0;

    let api_key_field = if in_keyring {
        store_api_key(&profile_name, &api_key)?;
        eprintln!("   ✓ API key stored in system keyring");
        None
    } else {
        Some(api_key)
    };

    let profile = Profile {
        url,
        group_key,
        api_key: api_key_field,
        verify_ssl: Some(verify_ssl),
        stream_type: Some(stream_type),
        ..Profile::default()
    };
    config::update_config(|cfg| -> Result<(), CliError> {
        cfg.profiles.insert(profile_name.clone(), profile);
        cfg.default_profile = Some(profile_name.clone());
        Ok(())
    })?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: shinobi test");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_keys() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                url: "http://nvr".into(),
                group_key: "g".into(),
                api_key: Some("secret".into()),
                ..Profile::default()
            },
        );
        let shown = redacted(&cfg);
        assert_eq!(shown.profiles["home"].api_key.as_deref(), Some("***"));
        assert_eq!(cfg.profiles["home"].api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn set_accepts_dashed_keys() {
        let mut profile = Profile::default();
        set_profile_value(&mut profile, "poll-interval", "30".into()).unwrap();
        set_profile_value(&mut profile, "verify_ssl", "false".into()).unwrap();
        assert_eq!(profile.poll_interval, Some(30));
        assert_eq!(profile.verify_ssl, Some(false));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut profile = Profile::default();
        let err = set_profile_value(&mut profile, "colour", "red".into()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
