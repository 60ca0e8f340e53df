//! Shared configuration for assetly.
//!
//! TOML profiles, session-cookie resolution (env + keyring + plaintext),
//! and translation to `assetly_core::ClientConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use assetly_core::{ClientConfig, DEFAULT_POLL_INTERVAL, TlsVerification, UserId};

/// Keyring service name for stored session cookies.
pub const KEYRING_SERVICE: &str = "assetly";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is requested.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Poll period in humantime form (`"10s"`, `"1m"`).
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
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
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> String {
    humantime::format_duration(DEFAULT_POLL_INTERVAL).to_string()
}

/// A named server profile.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server root URL (e.g., "https://assets.example.com").
    pub server: String,

    /// Signed-in user whose notifications are shown.
    pub user_id: Option<UserId>,

    /// Session cookie `name=value` (plaintext; prefer keyring or env var).
    pub session_cookie: Option<String>,

    /// Environment variable name containing the session cookie.
    pub session_cookie_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override retry attempts for reads.
    pub retries: Option<u32>,

    /// Override the pause between read retries (humantime).
    pub retry_delay: Option<String>,

    /// Override poll period (humantime).
    pub poll_interval: Option<String>,

    #[serde(default)]
    pub alert: AlertSettings,
}

/// How new-notification alerts are played.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AlertSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Command that plays a WAV stream from stdin, e.g. `"aplay -q"`.
    pub player: Option<String>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            player: None,
        }
    }
}

fn default_true() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "assetly", "assetly").map_or_else(
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
    p.push("assetly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file, still layering `ASSETLY_*` variables on top.
///
/// Nested keys use a double underscore: `ASSETLY_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ASSETLY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Session resolution ──────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/session"),
    )?)
}

/// Store a session cookie in the system keyring.
pub fn store_session(profile_name: &str, cookie: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(cookie)?;
    Ok(())
}

/// Resolve the session cookie from env var, keyring, then plaintext.
///
/// A missing cookie is not an error: requests go out unauthenticated and
/// the server decides.
pub fn resolve_session(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_session_with(
        profile,
        |name| std::env::var(name).ok(),
        || {
            keyring_entry(profile_name)
                .ok()
                .and_then(|entry| entry.get_password().ok())
        },
    )
}

fn resolve_session_with(
    profile: &Profile,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl FnOnce() -> Option<String>,
) -> Option<SecretString> {
    // 1. Profile's session_cookie_env → env var lookup
    if let Some(value) = profile.session_cookie_env.as_deref().and_then(&env) {
        return Some(SecretString::from(value));
    }

    // 2. System keyring
    if let Some(value) = keyring() {
        return Some(SecretString::from(value));
    }

    // 3. Plaintext in config
    profile.session_cookie.clone().map(SecretString::from)
}

// ── Translation to core config ──────────────────────────────────────

/// Parse a humantime duration, naming the offending field on failure.
pub fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(value).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("'{value}': {e}"),
    })?;
    if duration.is_zero() {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(duration)
}

/// Parse and validate a server URL.
pub fn parse_server(value: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = value.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {value}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Build a `ClientConfig` with an already-resolved session cookie.
pub fn client_config(
    profile: &Profile,
    defaults: &Defaults,
    session: Option<SecretString>,
) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::new(parse_server(&profile.server)?);

    config.session = session;
    config.user_id = profile.user_id;
    config.tls = tls_for(profile, defaults.insecure);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    if let Some(retries) = profile.retries {
        config.retries = retries;
    }
    if let Some(ref delay) = profile.retry_delay {
        config.retry_delay = parse_duration("retry_delay", delay)?;
    }
    config.poll_interval = parse_duration(
        "poll_interval",
        profile
            .poll_interval
            .as_deref()
            .unwrap_or(&defaults.poll_interval),
    )?;

    Ok(config)
}

/// TLS mode for a profile: insecure beats a custom CA beats system roots.
pub fn tls_for(profile: &Profile, insecure: bool) -> TlsVerification {
    if insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "office"

[defaults]
output = "json"
poll_interval = "30s"

[profiles.office]
server = "https://assets.example.com"
user_id = 7
session_cookie = "connect.sid=plain"
timeout = 5

[profiles.office.alert]
player = "aplay -q"

[profiles.lab]
server = "http://10.0.0.5:3000"
insecure = true
poll_interval = "2m"
retry_delay = "2s"
"#;

    fn load(contents: &str) -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn loads_profiles_over_defaults() {
        let config = load(SAMPLE);

        assert_eq!(config.default_profile_name(), "office");
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.color, "auto");

        let office = config.profile("office").unwrap();
        assert_eq!(office.user_id, Some(7));
        assert!(office.alert.enabled);
        assert_eq!(office.alert.player.as_deref(), Some("aplay -q"));
        assert!(matches!(
            config.profile("missing"),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile_name(), "default");
        assert_eq!(config.defaults.poll_interval, "10s");
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                server: "https://assets.example.com".into(),
                user_id: Some(3),
                ..Profile::default()
            },
        );

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles, config.profiles);
    }

    #[test]
    fn profile_translates_to_client_config() {
        let config = load(SAMPLE);
        let lab = config.profile("lab").unwrap();
        let client = client_config(lab, &config.defaults, None).unwrap();

        assert_eq!(client.url.as_str(), "http://10.0.0.5:3000/");
        assert_eq!(client.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(client.poll_interval, Duration::from_secs(120));
        assert_eq!(client.retry_delay, Duration::from_secs(2));
        assert_eq!(client.timeout, Duration::from_secs(30));
        assert_eq!(client.user_id, None);
    }

    #[test]
    fn bad_values_are_validation_errors() {
        let profile = Profile {
            server: "ftp://assets.example.com".into(),
            ..Profile::default()
        };
        let err = client_config(&profile, &Defaults::default(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "server"));

        assert!(parse_duration("poll_interval", "soon").is_err());
        assert!(parse_duration("poll_interval", "0s").is_err());
        assert_eq!(
            parse_duration("poll_interval", "1m 30s").unwrap(),
            Duration::from_secs(90)
        );
    }

    #[test]
    fn session_resolution_order() {
        let profile = Profile {
            session_cookie: Some("connect.sid=plain".into()),
            session_cookie_env: Some("ASSETLY_TEST_SESSION".into()),
            ..Profile::default()
        };

        let from_env = resolve_session_with(
            &profile,
            |name| (name == "ASSETLY_TEST_SESSION").then(|| "connect.sid=env".into()),
            || Some("connect.sid=keyring".into()),
        );
        assert_eq!(from_env.unwrap().expose_secret(), "connect.sid=env");

        let from_keyring =
            resolve_session_with(&profile, |_| None, || Some("connect.sid=keyring".into()));
        assert_eq!(from_keyring.unwrap().expose_secret(), "connect.sid=keyring");

        let from_plain = resolve_session_with(&profile, |_| None, || None);
        assert_eq!(from_plain.unwrap().expose_secret(), "connect.sid=plain");

        let none = resolve_session_with(&Profile::default(), |_| None, || None);
        assert!(none.is_none());
    }

    #[test]
    fn tls_precedence() {
        let profile = Profile {
            ca_cert: Some("/etc/ssl/assets.pem".into()),
            ..Profile::default()
        };
        assert_eq!(
            tls_for(&profile, false),
            TlsVerification::CustomCa("/etc/ssl/assets.pem".into())
        );
        assert_eq!(tls_for(&profile, true), TlsVerification::DangerAcceptInvalid);
        assert_eq!(tls_for(&Profile::default(), false), TlsVerification::SystemDefaults);
    }
}
