use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, header::AUTHORIZATION};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    clock::Clock,
    config::Config,
    error::AuthError,
    types::{ProviderError, TokenResponse},
    utils,
};

/// Seconds before expiry at which the cached application token is renewed.
const APP_TOKEN_BUFFER_SECS: i64 = 60;

/// The three interactions with the identity provider's token endpoint.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Swaps an authorization code for a token pair (`grant_type=authorization_code`).
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError>;

    /// Mints a new access token (`grant_type=refresh_token`).
    ///
    /// A rejection means the user must authorize again; callers do not retry.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError>;

    /// Application token unbound to any user, for anonymous catalog queries.
    async fn client_credentials(&self) -> Result<String, AuthError>;

    /// Forgets a cached application token so the next call requests a new one.
    async fn invalidate_client_credentials(&self) {}
}

#[derive(Debug, Clone)]
struct AppToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// [`TokenExchange`] against the Spotify accounts service.
///
/// Every request is a form-encoded POST authenticated with HTTP Basic auth
/// built from the application's client id and secret.
pub struct SpotifyTokenClient {
    http: Client,
    config: Arc<Config>,
    clock: Arc<dyn Clock>,
    app_token: Mutex<Option<AppToken>>,
}

impl SpotifyTokenClient {
    pub fn new(http: Client, config: Arc<Config>, clock: Arc<dyn Clock>) -> Self {
        Self {
            http,
            config,
            clock,
            app_token: Mutex::new(None),
        }
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let grant_type = form
            .iter()
            .find(|(k, _)| *k == "grant_type")
            .map(|(_, v)| *v)
            .unwrap_or_default();
        debug!(grant_type, "requesting token");

        let res = self
            .http
            .post(&self.config.token_url)
            .header(
                AUTHORIZATION,
                utils::basic_credentials(&self.config.client_id, &self.config.client_secret),
            )
            .form(form)
            .send()
            .await
            .map_err(|e| {
                warn!(grant_type, "token request failed: {}", e);
                AuthError::Network(e.to_string())
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !status.is_success() {
            let err: ProviderError = serde_json::from_str(&body).unwrap_or_default();
            let reason = err
                .error_description
                .or(err.error)
                .unwrap_or_else(|| format!("token endpoint responded with {status}"));
            warn!(grant_type, %status, "token request rejected: {}", reason);
            return Err(AuthError::ExchangeFailed(reason));
        }

        serde_json::from_str(&body)
            .map_err(|e| AuthError::ExchangeFailed(format!("malformed token response: {e}")))
    }
}

#[async_trait]
impl TokenExchange for SpotifyTokenClient {
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        if !self.config.is_configured() {
            return Err(AuthError::NotConfigured);
        }

        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.config.redirect_uri),
        ])
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        if !self.config.is_configured() {
            return Err(AuthError::NotConfigured);
        }

        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn client_credentials(&self) -> Result<String, AuthError> {
        if !self.config.has_client_credentials() {
            return Err(AuthError::NotConfigured);
        }

        let now = self.clock.now();
        if let Some(token) = self.app_token.lock().await.as_ref() {
            if now < token.expires_at - Duration::seconds(APP_TOKEN_BUFFER_SECS) {
                return Ok(token.access_token.clone());
            }
        }

        let res = self
            .request_token(&[("grant_type", "client_credentials")])
            .await?;
        let token = AppToken {
            access_token: res.access_token,
            expires_at: now + Duration::seconds(res.expires_in.min(i32::MAX as u64) as i64),
        };

        let access_token = token.access_token.clone();
        *self.app_token.lock().await = Some(token);
        Ok(access_token)
    }

    async fn invalidate_client_credentials(&self) {
        *self.app_token.lock().await = None;
    }
}
