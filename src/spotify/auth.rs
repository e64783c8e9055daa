use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    clock::Clock,
    config::{Config, SPOTIFY_SCOPES},
    error::AuthError,
    management::{StateStore, TokenStore},
    spotify::token::TokenExchange,
    types::{AuthorizationStatus, TokenGrant, TokenRecord},
};

/// Seconds before `expires_at` at which a stored access token counts as stale.
pub const REFRESH_BUFFER_SECS: i64 = 60;

/// Drives the authorization-code flow and keeps stored tokens fresh.
///
/// Constructed once at process start and shared behind an `Arc`; it owns no
/// mutable state of its own; everything lives in the injected stores.
///
/// A user's status as seen through [`get_valid_access_token`]:
///
/// ```text
/// UNAUTHORIZED --complete_authorization--> VALID
/// VALID        --time passes buffer------> STALE
/// STALE        --refresh succeeds--------> VALID
/// STALE        --refresh fails-----------> None returned, caller prompts re-auth
/// ```
///
/// Refreshes are not coalesced: concurrent calls for the same stale user each
/// send their own refresh request, so a provider that rotates refresh tokens
/// may reject all but the first.
///
/// [`get_valid_access_token`]: TokenLifecycleManager::get_valid_access_token
pub struct TokenLifecycleManager {
    config: Arc<Config>,
    states: Arc<dyn StateStore>,
    tokens: Arc<dyn TokenStore>,
    exchange: Arc<dyn TokenExchange>,
    clock: Arc<dyn Clock>,
}

impl TokenLifecycleManager {
    pub fn new(
        config: Arc<Config>,
        states: Arc<dyn StateStore>,
        tokens: Arc<dyn TokenStore>,
        exchange: Arc<dyn TokenExchange>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            states,
            tokens,
            exchange,
            clock,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn exchange(&self) -> &Arc<dyn TokenExchange> {
        &self.exchange
    }

    fn ensure_configured(&self) -> Result<(), AuthError> {
        if self.is_configured() {
            Ok(())
        } else {
            warn!("Spotify credentials are not configured");
            Err(AuthError::NotConfigured)
        }
    }

    /// Creates a state bound to `user_id` and returns the provider URL the
    /// user must visit.
    pub async fn build_authorization_url(&self, user_id: &str) -> Result<String, AuthError> {
        self.ensure_configured()?;

        let state = self.states.create_state(user_id).await.map_err(|e| {
            warn!(user_id, "cannot start authorization: {}", e);
            e
        })?;

        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", SPOTIFY_SCOPES),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| {
            warn!("invalid authorization endpoint {}: {}", self.config.auth_url, e);
            AuthError::NotConfigured
        })?;

        info!(user_id, "initiating Spotify authorization");
        Ok(url.into())
    }

    /// Consumes `state`, exchanges `code` and stores the resulting tokens.
    ///
    /// Stops at the first failing stage. A consumed state is not restored when
    /// a later stage fails; the user restarts authorization.
    pub async fn complete_authorization(
        &self,
        code: &str,
        state: &str,
    ) -> Result<String, AuthError> {
        self.ensure_configured()?;

        let user_id = self.states.verify_and_consume(state).await.map_err(|e| {
            warn!("authorization state rejected: {}", e);
            e
        })?;

        let response = self.exchange.exchange_code(code).await?;
        let grant = TokenGrant::from_response(response, None).ok_or_else(|| {
            AuthError::ExchangeFailed("token response carried no refresh token".to_string())
        })?;

        self.tokens.save(&user_id, &grant).await.map_err(|e| {
            warn!(user_id = %user_id, "failed to save tokens: {}", e);
            e
        })?;

        info!(user_id = %user_id, "Spotify account linked");
        Ok(user_id)
    }

    /// Returns a currently valid access token for `user_id`.
    ///
    /// `Ok(None)` when the user never authorized or when a needed refresh was
    /// rejected; both mean the user has to authorize again.
    pub async fn get_valid_access_token(
        &self,
        user_id: &str,
    ) -> Result<Option<String>, AuthError> {
        self.ensure_configured()?;

        let Some(record) = self.tokens.get(user_id).await? else {
            debug!(user_id, "no stored token");
            return Ok(None);
        };

        if !self.is_stale(&record) {
            return Ok(Some(record.access_token));
        }

        debug!(user_id, "access token is stale, refreshing");
        self.refresh_record(record).await
    }

    /// Refreshes regardless of the stored expiry, e.g. after the resource API
    /// rejected a token that looked valid.
    pub async fn refresh_access_token(&self, user_id: &str) -> Result<Option<String>, AuthError> {
        self.ensure_configured()?;

        match self.tokens.get(user_id).await? {
            Some(record) => self.refresh_record(record).await,
            None => Ok(None),
        }
    }

    /// Reports the user's status without refreshing anything.
    pub async fn authorization_status(
        &self,
        user_id: &str,
    ) -> Result<AuthorizationStatus, AuthError> {
        Ok(match self.tokens.get(user_id).await? {
            None => AuthorizationStatus::Unauthorized,
            Some(record) if self.is_stale(&record) => AuthorizationStatus::Stale,
            Some(_) => AuthorizationStatus::Valid,
        })
    }

    fn is_stale(&self, record: &TokenRecord) -> bool {
        self.clock.now() >= record.expires_at - Duration::seconds(REFRESH_BUFFER_SECS)
    }

    async fn refresh_record(&self, record: TokenRecord) -> Result<Option<String>, AuthError> {
        let response = match self.exchange.refresh(&record.refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    user_id = %record.user_id,
                    "token refresh failed, re-authorization required: {}", e
                );
                return Ok(None);
            }
        };

        let grant = TokenGrant::from_response(response, Some(&record.refresh_token))
            .ok_or_else(|| AuthError::ExchangeFailed("refresh token missing".to_string()))?;
        let saved = self.tokens.save(&record.user_id, &grant).await.map_err(|e| {
            warn!(user_id = %record.user_id, "failed to save refreshed tokens: {}", e);
            e
        })?;

        debug!(user_id = %saved.user_id, expires_at = %saved.expires_at, "access token refreshed");
        Ok(Some(saved.access_token))
    }
}
