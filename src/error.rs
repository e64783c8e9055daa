use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the authorization flow and token lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Spotify client id, client secret and redirect URI must be configured")]
    NotConfigured,

    #[error("authorization state not found")]
    StateNotFound,

    #[error("authorization state expired")]
    StateExpired,

    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("storage error: {0}")]
    Persistence(String),

    #[error("network error: {0}")]
    Network(String),
}

impl AuthError {
    /// Name of the authorization stage that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            AuthError::NotConfigured => "configuration",
            AuthError::StateNotFound | AuthError::StateExpired => "state verification",
            AuthError::ExchangeFailed(_) | AuthError::Network(_) => "token exchange",
            AuthError::Persistence(_) => "token storage",
        }
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, AuthError::StateNotFound | AuthError::StateExpired)
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::Persistence(err.to_string())
    }
}

/// Failure of a single resource-API call made on behalf of a user or the app.
///
/// Never leaves the `spotify` module: actions log it and degrade to an empty
/// or negative result.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("user has not authorized Spotify access")]
    NotAuthorized,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Spotify responded with {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
