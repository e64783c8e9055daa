//! # Spotify Integration Module
//!
//! This module holds everything that talks to Spotify: the token endpoint
//! client, the token lifecycle manager, and the Web API actions built on top
//! of them.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers / CLI
//!          ↓
//! SpotifyApi actions (playback, search, recommendations)
//!          ↓
//! TokenLifecycleManager ── StateStore / TokenStore
//!          ↓
//! TokenExchange (accounts service)       reqwest → Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`token`] - Token endpoint client: authorization code, refresh token and
//!   client credentials grants, HTTP Basic client authentication.
//! - [`auth`] - Token lifecycle: authorization URLs, state verification,
//!   code exchange and transparent refresh near expiry.
//! - [`playback`] - User-scoped playback control (`/me/player`).
//! - [`search`] - Anonymous catalog search with the application token.
//! - [`recommendations`] - Recommendation ladder and seed-based queries.
//!
//! ## Request Contract
//!
//! Every user-scoped call goes through [`SpotifyApi`]:
//!
//! 1. Ask the lifecycle manager for a valid access token. No token means the
//!    user is not authorized and no request is sent.
//! 2. Send the request with `Authorization: Bearer <token>`.
//! 3. On `401 Unauthorized`, refresh once and retry once.
//! 4. Any other non-2xx status is a failure.
//!
//! Public actions never return errors. Failures are logged and degrade to
//! `false`, `None` or an empty list so callers can always render something.

pub mod auth;
pub mod playback;
pub mod recommendations;
pub mod search;
pub mod token;

use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode, header::CONTENT_LENGTH};
use tracing::debug;

use crate::{config::Config, error::ActionError, spotify::auth::TokenLifecycleManager};

/// Builds the HTTP client shared by the token client and the Web API client.
pub fn http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.http_timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

type Query<'a> = [(&'a str, String)];

/// Spotify Web API client acting for users or for the application.
pub struct SpotifyApi {
    http: Client,
    api_url: String,
    auth: Arc<TokenLifecycleManager>,
}

impl SpotifyApi {
    pub fn new(http: Client, config: &Config, auth: Arc<TokenLifecycleManager>) -> Self {
        Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn auth(&self) -> &Arc<TokenLifecycleManager> {
        &self.auth
    }

    /// Sends a request with the user's token, retrying once after a refresh
    /// if Spotify rejects the token.
    async fn user_request(
        &self,
        user_id: &str,
        method: Method,
        path: &str,
        query: &Query<'_>,
    ) -> Result<Response, ActionError> {
        let Some(token) = self.auth.get_valid_access_token(user_id).await? else {
            return Err(ActionError::NotAuthorized);
        };

        let res = self.send(method.clone(), path, query, &token).await?;
        if res.status() != StatusCode::UNAUTHORIZED {
            return check_status(res);
        }

        debug!(user_id, path, "access token rejected, refreshing once");
        let Some(token) = self.auth.refresh_access_token(user_id).await? else {
            return Err(ActionError::NotAuthorized);
        };
        check_status(self.send(method, path, query, &token).await?)
    }

    /// Sends a GET with the application token from the client-credentials flow.
    async fn app_request(&self, path: &str, query: &Query<'_>) -> Result<Response, ActionError> {
        let exchange = self.auth.exchange();
        let token = exchange.client_credentials().await?;

        let res = self.send(Method::GET, path, query, &token).await?;
        if res.status() != StatusCode::UNAUTHORIZED {
            return check_status(res);
        }

        debug!(path, "application token rejected, requesting a new one");
        exchange.invalidate_client_credentials().await;
        let token = exchange.client_credentials().await?;
        check_status(self.send(Method::GET, path, query, &token).await?)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        token: &str,
    ) -> Result<Response, reqwest::Error> {
        let has_body = method != Method::GET;
        let mut req = self
            .http
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(token);
        if !query.is_empty() {
            req = req.query(query);
        }
        if has_body {
            req = req.header(CONTENT_LENGTH, "0");
        }
        req.send().await
    }
}

fn check_status(res: Response) -> Result<Response, ActionError> {
    if res.status().is_success() {
        Ok(res)
    } else {
        Err(ActionError::Status(res.status()))
    }
}

/// Spotify ids are base-62; anything else would escape the URL path segment.
pub fn is_spotify_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}
