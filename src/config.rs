//! Configuration management for spotlink.
//!
//! This module handles loading configuration values from environment
//! variables and `.env` files. Configuration is read once into a [`Config`]
//! value which is then passed to every component that needs it; nothing in
//! the crate reads the environment after startup.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

/// Spotify OAuth authorization endpoint.
pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";

/// Spotify OAuth token endpoint.
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Spotify Web API base URL.
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Permissions requested from every user during authorization.
pub const SPOTIFY_SCOPES: &str =
    "user-read-currently-playing user-modify-playback-state user-read-playback-state";

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:6100";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the data directory if it doesn't exist and loads environment
/// variables from `spotlink/.env` inside the platform-specific local data
/// directory. A missing `.env` file is not an error; the process environment
/// alone may carry the configuration.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotlink/.env`
/// - macOS: `~/Library/Application Support/spotlink/.env`
/// - Windows: `%LOCALAPPDATA%/spotlink/.env`
///
/// # Errors
///
/// Returns an error if the directory cannot be created or an existing `.env`
/// file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = default_data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

/// Process-wide, read-only application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_addr: String,
    pub data_dir: PathBuf,
    pub http_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Required credentials that are absent are left empty rather than
    /// failing here, so that [`Config::is_configured`] can report the problem
    /// at the first operation that needs them.
    pub fn from_env() -> Self {
        Self {
            client_id: var_or("SPOTIFY_API_AUTH_CLIENT_ID", ""),
            client_secret: var_or("SPOTIFY_API_AUTH_CLIENT_SECRET", ""),
            redirect_uri: var_or("SPOTIFY_API_REDIRECT_URI", ""),
            auth_url: var_or("SPOTIFY_API_AUTH_URL", SPOTIFY_AUTH_URL),
            token_url: var_or("SPOTIFY_API_TOKEN_URL", SPOTIFY_TOKEN_URL),
            api_url: var_or("SPOTIFY_API_URL", SPOTIFY_API_URL),
            server_addr: var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            data_dir: env::var("SPOTLINK_DATA_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            http_timeout: Duration::from_secs(
                env::var("SPOTLINK_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
        }
    }

    /// Builds a configuration with the given credentials and default endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_url: SPOTIFY_AUTH_URL.to_string(),
            token_url: SPOTIFY_TOKEN_URL.to_string(),
            api_url: SPOTIFY_API_URL.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            data_dir: default_data_dir(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// True iff client id, client secret and redirect URI are all non-empty.
    pub fn is_configured(&self) -> bool {
        [&self.client_id, &self.client_secret, &self.redirect_uri]
            .iter()
            .all(|v| !v.trim().is_empty())
    }

    /// Enough for the client-credentials flow, which has no redirect.
    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    /// Points both accounts endpoints at `base` (`{base}/authorize`, `{base}/api/token`).
    pub fn with_accounts_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.auth_url = format!("{base}/authorize");
        self.token_url = format!("{base}/api/token");
        self
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|_| default.to_string())
}

fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotlink");
    path
}
