//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

const KEYS: &str = "server, user_id, session_cookie, session_cookie_env, ca_cert, insecure, \
                    timeout, retries, retry_delay, poll_interval, alert_enabled, alert_player";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `config set <key> <value>` to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key.replace('-', "_").as_str() {
        "server" => {
            assetly_config::parse_server(&value)?;
            profile.server = value;
        }
        "user_id" | "user" => profile.user_id = Some(parse_value(key, &value, "a number")?),
        "session_cookie" => profile.session_cookie = Some(value),
        "session_cookie_env" => profile.session_cookie_env = Some(value),
        "ca_cert" => profile.ca_cert = Some(value.into()),
        "insecure" => profile.insecure = Some(parse_value(key, &value, "'true' or 'false'")?),
        "timeout" => profile.timeout = Some(parse_value(key, &value, "a number (seconds)")?),
        "retries" => profile.retries = Some(parse_value(key, &value, "a number")?),
        "retry_delay" => {
            assetly_config::parse_duration("retry_delay", &value)?;
            profile.retry_delay = Some(value);
        }
        "poll_interval" => {
            assetly_config::parse_duration("poll_interval", &value)?;
            profile.poll_interval = Some(value);
        }
        "alert_enabled" | "alert.enabled" => {
            profile.alert.enabled = parse_value(key, &value, "'true' or 'false'")?;
        }
        "alert_player" | "alert.player" => {
            profile.alert.player = (!value.trim().is_empty()).then_some(value);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {KEYS}"),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n# {e}")),
                |c| c.default_profile_name().to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: assetly config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetSession { name } => {
            let cfg = config::load_config_or_default();
            let profile_name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let cookie = prompt_cookie()?;
            assetly_config::store_session(&profile_name, &cookie)?;
            eprintln!("✓ Session cookie stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

fn prompt_cookie() -> Result<String, CliError> {
    let cookie = rpassword::prompt_password("Session cookie (name=value): ").map_err(prompt_err)?;
    let cookie = cookie.trim().to_owned();
    if !cookie.contains('=') {
        return Err(CliError::Validation {
            field: "session_cookie".into(),
            reason: "expected name=value, e.g. connect.sid=s%3A...".into(),
        });
    }
    Ok(cookie)
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("assetly configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let server: String = Input::new()
        .with_prompt("Server URL")
        .default("https://assets.example.com".into())
        .validate_with(|s: &String| {
            assetly_config::parse_server(s)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let user: String = Input::new()
        .with_prompt("Your user id (blank to skip)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let user_id = if user.trim().is_empty() {
        None
    } else {
        Some(parse_value("user_id", user.trim(), "a number")?)
    };

    let mut profile = Profile {
        server,
        user_id,
        ..Profile::default()
    };

    let session_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
        "Skip for now",
    ];
    let selection = Select::new()
        .with_prompt("Session cookie")
        .items(session_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    match selection {
        0 => {
            let cookie = prompt_cookie()?;
            assetly_config::store_session(&profile_name, &cookie)?;
            eprintln!("   ✓ Session cookie stored in system keyring");
        }
        1 => profile.session_cookie = Some(prompt_cookie()?),
        _ => {}
    }

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: assetly search laptop");
    Ok(())
}
