use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::{authorize::start_authorization, page};
use crate::{error::AuthError, spotify::auth::TokenLifecycleManager};

/// Redirect target of the authorization flow.
///
/// Accepts three shapes of query string:
/// - `error=...` when the user declined on Spotify's consent page,
/// - `code` and `state` to finish authorization,
/// - `userId` alone to start it, same as [`authorize`](super::authorize).
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(auth): Extension<Arc<TokenLifecycleManager>>,
) -> Response {
    let param = |key: &str| params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(reason) = param("error") {
        warn!(reason, "authorization declined by provider");
        let message = if reason == "access_denied" {
            "Access to Spotify was denied.".to_string()
        } else {
            format!("Spotify reported an error: {reason}")
        };
        return page(StatusCode::BAD_REQUEST, "Authorization Failed", &message).into_response();
    }

    match (param("code"), param("state"), param("userId")) {
        (Some(code), Some(state), _) => finish_authorization(&auth, code, state).await,
        (None, None, Some(user_id)) => start_authorization(&auth, user_id).await,
        _ => page(
            StatusCode::BAD_REQUEST,
            "Authorization Failed",
            "Missing code or state.",
        )
        .into_response(),
    }
}

async fn finish_authorization(auth: &TokenLifecycleManager, code: &str, state: &str) -> Response {
    match auth.complete_authorization(code, state).await {
        Ok(_) => page(
            StatusCode::OK,
            "Spotify Connected!",
            "Your Spotify account is linked. You can close this window.",
        )
        .into_response(),
        Err(e) => {
            let status = match e {
                AuthError::NotConfigured | AuthError::Persistence(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                _ => StatusCode::BAD_REQUEST,
            };
            let message = format!(
                "Authorization failed during {}. Please start again.",
                e.stage()
            );
            page(status, "Authorization Failed", &message).into_response()
        }
    }
}
