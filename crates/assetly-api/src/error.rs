use thiserror::Error;

/// Top-level error type for the `assetly-api` crate.
///
/// Covers the three failure families of the asset API: the request never
/// completed (transport), the server rejected it (status), or the body did
/// not match the expected shape (deserialization). `assetly-core` maps these
/// into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Session cookie missing, expired, or rejected (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Authenticated, but not allowed to touch this resource (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server rejections ───────────────────────────────────────────
    /// The requested resource does not exist (HTTP 404).
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Gateway-style statuses count as transient; every other rejection is
    /// a definitive answer from the server.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::NotFound { .. } => true,
            _ => false,
        }
    }

    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
