//! CLI configuration: thin wrapper around `assetly_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--server, --user, --session, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use assetly_core::{ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use assetly_config::{
    AlertSettings, Config, Profile, config_path, load_config_or_default, save_config,
};

/// Everything a server-bound command needs from configuration.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub client: ClientConfig,
    pub alert: AlertSettings,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Build the client configuration from the config file, profile, and flags.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    resolve_from(global, &load_config_or_default())
}

pub fn resolve_from(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let Some(profile) = cfg.profiles.get(&profile_name) else {
        // An explicitly requested profile must exist.
        if global.profile.is_some() {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        return resolve_without_profile(global, cfg, profile_name);
    };

    let session = global
        .session
        .clone()
        .map(SecretString::from)
        .or_else(|| assetly_config::resolve_session(profile, &profile_name));

    let mut client = assetly_config::client_config(profile, &cfg.defaults, session)?;
    apply_overrides(&mut client, global)?;

    Ok(Resolved {
        profile_name,
        client,
        alert: profile.alert.clone(),
    })
}

/// No profile found: build from flags / env vars alone.
fn resolve_without_profile(
    global: &GlobalOpts,
    cfg: &Config,
    profile_name: String,
) -> Result<Resolved, CliError> {
    let server = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;

    let mut client = ClientConfig::new(assetly_config::parse_server(server)?);
    client.session = global.session.clone().map(SecretString::from);
    client.timeout = Duration::from_secs(cfg.defaults.timeout);
    client.poll_interval =
        assetly_config::parse_duration("poll_interval", &cfg.defaults.poll_interval)?;
    if cfg.defaults.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }
    apply_overrides(&mut client, global)?;

    Ok(Resolved {
        profile_name,
        client,
        alert: AlertSettings::default(),
    })
}

/// CLI flags take priority over profile values.
fn apply_overrides(client: &mut ClientConfig, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(ref server) = global.server {
        client.url = assetly_config::parse_server(server)?;
    }
    if let Some(user) = global.user {
        client.user_id = Some(user);
    }
    if global.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Duration::from_secs(secs);
    }
    Ok(())
}

pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}
