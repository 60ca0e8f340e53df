// Shared transport configuration for building reqwest::Client instances.
//
// TLS, timeout, cookie, and retry settings live here so the client module
// only deals with URL construction and response handling.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::Error;

/// Attempts made for idempotent reads before giving up.
pub const DEFAULT_RETRIES: u32 = 3;

/// Pause between retry attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// TLS verification mode (api-level mirror of core's TlsVerification).
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed development servers).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
    /// Extra attempts for idempotent GETs on transient failures.
    pub retries: u32,
    /// Fixed pause between retry attempts.
    pub retry_delay: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            cookie_jar: None,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("assetly/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Create a config with a fresh cookie jar.
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    /// Seed the cookie jar with a session cookie issued by the auth service.
    ///
    /// `cookie` is a raw `name=value` pair, e.g. `connect.sid=s%3Aabc`.
    pub fn with_session_cookie(self, base_url: &Url, cookie: &SecretString) -> Self {
        let config = if self.cookie_jar.is_some() {
            self
        } else {
            self.with_cookie_jar()
        };
        if let Some(ref jar) = config.cookie_jar {
            jar.add_cookie_str(cookie.expose_secret(), base_url);
        }
        config
    }
}
