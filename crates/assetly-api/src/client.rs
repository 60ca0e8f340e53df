// Asset API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, status mapping, and the
// retry policy for idempotent reads. Endpoint methods live in the sibling
// `inventory` and `notifications` modules as inherent impls, so this file
// stays focused on transport mechanics.

use std::time::Duration;

use reqwest::cookie::CookieStore;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest body excerpt kept in error messages.
const BODY_PREVIEW: usize = 200;

/// HTTP client for the asset management REST API.
///
/// Authentication is cookie-based and issued elsewhere: the caller seeds
/// the transport's cookie jar with the session cookie and every request
/// carries it. Cheap to clone; clones share the connection pool and jar.
#[derive(Clone)]
pub struct AssetClient {
    http: reqwest::Client,
    base_url: Url,
    retries: u32,
    retry_delay: Duration,
    cookie_jar: Option<std::sync::Arc<reqwest::cookie::Jar>>,
}

impl AssetClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the server root (e.g. `https://assets.example.com`);
    /// endpoint paths are appended as `/api/...`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            retries: config.retries,
            retry_delay: config.retry_delay,
            cookie_jar: config.cookie_jar,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`, without retries.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            retries: 0,
            retry_delay: Duration::ZERO,
            cookie_jar: None,
        }
    }

    /// Override the retry policy.
    pub fn with_retries(mut self, retries: u32, delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = delay;
        self
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a session cookie is present for the server.
    pub fn has_session(&self) -> bool {
        self.cookie_jar
            .as_ref()
            .and_then(|jar| jar.cookies(&self.base_url))
            .is_some()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body, retrying transient
    /// failures up to the configured attempt count.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let mut attempt = 0;
        loop {
            debug!(attempt, "GET {}", url);
            let result = match self.http.get(url.clone()).send().await {
                Ok(resp) => Self::parse_json(resp).await,
                Err(e) => Err(Error::Transport(e)),
            };

            match result {
                Err(e) if e.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "transient failure, retrying");
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                other => return other,
            }
        }
    }

    /// Send a PUT request without a body; only the status matters.
    pub(crate) async fn put_empty(&self, url: Url) -> Result<(), Error> {
        debug!("PUT {}", url);
        let resp = self.http.put(url).send().await.map_err(Error::Transport)?;
        Self::check_status(resp).await.map(drop)
    }

    /// Send a DELETE request; only the status matters.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);
        let resp = self.http.delete(url).send().await.map_err(Error::Transport)?;
        Self::check_status(resp).await.map(drop)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Map non-success statuses onto the error taxonomy.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let path = resp.url().path().to_owned();
        let body = resp.text().await.unwrap_or_default();
        let message = extract_message(&body);

        Err(match status.as_u16() {
            401 => Error::Authentication {
                message: if message.is_empty() {
                    "session expired or missing".into()
                } else {
                    message
                },
            },
            403 => Error::Forbidden { message },
            404 => Error::NotFound { path },
            code => Error::Status {
                status: code,
                message,
            },
        })
    }

    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let resp = Self::check_status(resp).await?;
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(len = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

/// Pull `{"message": "..."}` out of an error body, or fall back to a preview.
fn extract_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| preview(body).to_owned())
}

fn preview(body: &str) -> &str {
    if body.len() <= BODY_PREVIEW {
        return body;
    }
    let mut end = BODY_PREVIEW;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_without_double_slashes() {
        let client = AssetClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://assets.example.com/").unwrap(),
        );
        assert_eq!(
            client.api_url("/users/4/notifications").unwrap().as_str(),
            "https://assets.example.com/api/users/4/notifications"
        );
    }

    #[test]
    fn extract_message_prefers_json_message() {
        assert_eq!(extract_message(r#"{"message":"Device not found"}"#), "Device not found");
        assert_eq!(extract_message("plain failure"), "plain failure");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = "é".repeat(150);
        let p = preview(&body);
        assert!(p.len() <= BODY_PREVIEW);
        assert!(body.starts_with(p));
    }
}
