// ── AssetService ──
//
// Entry point for consumers. Builds the HTTP client from a `ClientConfig`
// and hands out search sessions and notification pollers that share it.

use std::sync::Arc;

use tracing::debug;

use assetly_api::transport::{TlsMode, TransportConfig};
use assetly_api::{AssetClient, Category, Device, Notification, NotificationId, User, UserId};

use crate::config::{ClientConfig, TlsVerification};
use crate::error::CoreError;
use crate::fetch::{EntityFetcher, NotificationSource};
use crate::notify::{Chime, NotificationPoller, PollHandle};
use crate::search::SearchSession;

/// A configured connection to one asset server.
#[derive(Clone)]
pub struct AssetService {
    config: ClientConfig,
    client: Arc<AssetClient>,
}

impl AssetService {
    /// Build the HTTP client. No request is made until the first call.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = AssetClient::new(config.url.clone(), &transport)?;
        debug!(url = %config.url, session = client.has_session(), "asset client ready");
        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &AssetClient {
        &self.client
    }

    /// The configured user, or [`CoreError::NoUser`].
    pub fn user_id(&self) -> Result<UserId, CoreError> {
        self.config.user_id.ok_or_else(|| CoreError::NoUser {
            message: "set user_id in the profile or pass --user".into(),
        })
    }

    // ── Inventory ────────────────────────────────────────────────────

    pub async fn users(&self) -> Result<Vec<User>, CoreError> {
        self.client.users().await
    }

    pub async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        self.client.devices().await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, CoreError> {
        self.client.categories().await
    }

    // ── Notifications ────────────────────────────────────────────────

    pub async fn notifications(&self) -> Result<Vec<Notification>, CoreError> {
        self.client.notifications(self.user_id()?).await
    }

    pub async fn unread_notifications(&self) -> Result<Vec<Notification>, CoreError> {
        self.client.unread_notifications(self.user_id()?).await
    }

    pub async fn mark_read(&self, id: NotificationId) -> Result<(), CoreError> {
        NotificationSource::mark_read(&*self.client, id).await
    }

    pub async fn delete_notification(&self, id: NotificationId) -> Result<(), CoreError> {
        NotificationSource::delete(&*self.client, id).await
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// A closed search session over this server's collections.
    pub fn search_session(&self) -> SearchSession<AssetClient> {
        SearchSession::new(AssetClient::clone(&self.client))
    }

    /// A poller using this server and the configured interval.
    pub fn poller<C: Chime>(&self, chime: Arc<C>) -> NotificationPoller<AssetClient, C> {
        NotificationPoller::new(Arc::clone(&self.client), chime)
            .with_interval(self.config.poll_interval)
    }

    /// Start polling for the configured user.
    pub fn start_polling<C: Chime>(&self, chime: Arc<C>) -> Result<PollHandle<AssetClient>, CoreError> {
        let user = self.user_id()?;
        Ok(self.poller(chime).start(user))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn build_transport(config: &ClientConfig) -> TransportConfig {
    let transport = TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        retries: config.retries,
        retry_delay: config.retry_delay,
        ..TransportConfig::default()
    };
    match config.session {
        Some(ref cookie) => transport.with_session_cookie(&config.url, cookie),
        None => transport,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use url::Url;

    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(Url::parse("https://assets.example.com").unwrap())
    }

    #[test]
    fn transport_carries_settings() {
        let mut config = config();
        config.tls = TlsVerification::DangerAcceptInvalid;
        config.timeout = Duration::from_secs(5);
        config.retries = 1;
        config.retry_delay = Duration::from_secs(2);
        config.session = Some(SecretString::from("connect.sid=abc".to_string()));

        let transport = build_transport(&config);
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert_eq!(transport.retries, 1);
        assert_eq!(transport.retry_delay, Duration::from_secs(2));
        assert!(transport.cookie_jar.is_some());
    }

    #[test]
    fn missing_user_is_reported() {
        let service = AssetService::new(config()).unwrap();
        assert!(matches!(service.user_id(), Err(CoreError::NoUser { .. })));
        assert!(!service.client().has_session());
    }
}
