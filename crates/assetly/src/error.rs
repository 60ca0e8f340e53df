//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use assetly_config::ConfigError;
use assetly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to asset server at {url}")]
    #[diagnostic(
        code(assetly::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             URL: {url}\n\
             Self-signed certificate? Try: --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(assetly::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(assetly::auth_failed),
        help(
            "The session cookie is missing or expired. Sign in through the web\n\
             front end, copy the session cookie, then run: assetly config set-session"
        )
    )]
    AuthFailed { message: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(code(assetly::forbidden))]
    Forbidden { message: String },

    #[error("No user selected")]
    #[diagnostic(
        code(assetly::no_user),
        help("Pass --user <ID>, set ASSETLY_USER, or run: assetly config set user_id <ID>")
    )]
    NoUser,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(assetly::not_found),
        help("Run: assetly {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    #[diagnostic(code(assetly::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(assetly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(assetly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: assetly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(assetly::no_config),
        help(
            "Create a profile with: assetly config init\n\
             Or pass --server / set ASSETLY_SERVER.\n\
             Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(assetly::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(assetly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(assetly::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(assetly::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NoUser
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: "(see: assetly config profiles)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout => CliError::Timeout,

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{} list", plural(&entity_type)),
                resource_type: entity_type,
                identifier,
            },

            CoreError::NoUser { .. } => CliError::NoUser,

            CoreError::Api {
                message,
                status: Some(403),
            } => CliError::Forbidden { message },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                status: None,
                message,
            },
        }
    }
}

/// Command group name for an entity type.
fn plural(entity_type: &str) -> String {
    match entity_type {
        "category" => "categories".into(),
        other => format!("{other}s"),
    }
}
