use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::warn;

use super::page;
use crate::{error::AuthError, spotify::auth::TokenLifecycleManager};

/// Starts authorization for `userId` by redirecting to Spotify.
pub async fn authorize(
    Query(params): Query<HashMap<String, String>>,
    Extension(auth): Extension<Arc<TokenLifecycleManager>>,
) -> Response {
    match params.get("userId").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(user_id) => start_authorization(&auth, user_id).await,
        None => page(
            StatusCode::BAD_REQUEST,
            "Authorization Failed",
            "Missing userId.",
        )
        .into_response(),
    }
}

pub(crate) async fn start_authorization(auth: &TokenLifecycleManager, user_id: &str) -> Response {
    match auth.build_authorization_url(user_id).await {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            warn!(user_id, "cannot start authorization: {}", e);
            let message = match e {
                AuthError::NotConfigured => "Spotify is not configured on this server.",
                _ => "Could not start authorization. Please try again.",
            };
            page(StatusCode::INTERNAL_SERVER_ERROR, "Authorization Failed", message)
                .into_response()
        }
    }
}
