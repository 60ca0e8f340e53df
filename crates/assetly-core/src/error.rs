// ── Core error types ──
//
// User-facing errors from assetly-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<assetly_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach asset server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("No signed-in user: {message}")]
    NoUser { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<assetly_api::Error> for CoreError {
    fn from(err: assetly_api::Error) -> Self {
        match err {
            assetly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            assetly_api::Error::Forbidden { message } => CoreError::Api {
                message,
                status: Some(403),
            },
            assetly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            assetly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            assetly_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            assetly_api::Error::NotFound { path } => CoreError::NotFound {
                entity_type: "resource".into(),
                identifier: path,
            },
            assetly_api::Error::Status { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            assetly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_keep_their_code() {
        let core: CoreError = assetly_api::Error::Status {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(
            core,
            CoreError::Api {
                status: Some(500),
                ..
            }
        ));
    }

    #[test]
    fn unauthorized_becomes_authentication_failure() {
        let core: CoreError = assetly_api::Error::Authentication {
            message: "expired".into(),
        }
        .into();
        assert!(matches!(core, CoreError::AuthenticationFailed { .. }));
    }
}
