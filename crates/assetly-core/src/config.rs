// ── Runtime connection configuration ──
//
// These types describe *how* to talk to an asset server. They carry the
// session cookie and connection tuning, but never touch disk. The CLI
// constructs a `ClientConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use assetly_api::UserId;

/// Default notification poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single asset server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root URL (e.g., `https://assets.example.com`).
    pub url: Url,
    /// Session cookie (`name=value`) issued by the auth service.
    pub session: Option<SecretString>,
    /// The signed-in user whose notifications are polled.
    pub user_id: Option<UserId>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Extra attempts for idempotent reads on transient failures.
    pub retries: u32,
    /// Fixed pause between those attempts.
    pub retry_delay: Duration,
    /// Notification poll period.
    pub poll_interval: Duration,
}

impl ClientConfig {
    /// Config for `url` with library defaults for everything else.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            session: None,
            user_id: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            retries: assetly_api::transport::DEFAULT_RETRIES,
            retry_delay: assetly_api::transport::DEFAULT_RETRY_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
