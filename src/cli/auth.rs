use std::time::{Duration, Instant};

use crate::{
    app::App, error, info, server::start_api_server, success, types::AuthorizationStatus,
    warning,
};

use super::spinner;

/// How long `connect` waits for the browser round trip.
const MAX_WAIT: Duration = Duration::from_secs(120);

pub async fn connect(app: &App, user_id: &str) {
    if !app.auth.is_configured() {
        error!(
            "Spotify is not configured. Set SPOTIFY_API_AUTH_CLIENT_ID, \
             SPOTIFY_API_AUTH_CLIENT_SECRET and SPOTIFY_API_REDIRECT_URI."
        );
    }

    match app.auth.authorization_status(user_id).await {
        Ok(AuthorizationStatus::Valid) => {
            success!("{} is already connected to Spotify.", user_id);
            return;
        }
        Ok(_) => {}
        Err(e) => error!("Cannot read stored tokens. Err: {}", e),
    }

    // start API server
    let server_app = app.clone();
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_app).await {
            warning!("Authorization server stopped. Err: {}", e);
        }
    });

    let auth_url = match app.auth.build_authorization_url(user_id).await {
        Ok(url) => url,
        Err(e) => error!("Cannot start authorization. Err: {}", e),
    };

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let pb = spinner("Waiting for Spotify authorization...");
    let linked = wait_for_authorization(app, user_id).await;
    pb.finish_and_clear();

    if linked {
        success!("Spotify account linked for {}.", user_id);
    } else {
        error!("Authorization failed or timed out.");
    }
}

pub async fn status(app: &App, user_id: &str) {
    if !app.auth.is_configured() {
        warning!("Spotify is not configured; stored tokens cannot be refreshed.");
    }

    match app.auth.authorization_status(user_id).await {
        Ok(AuthorizationStatus::Valid) => success!("{} is connected to Spotify.", user_id),
        Ok(AuthorizationStatus::Stale) => {
            info!("{} is connected; the token is refreshed on next use.", user_id)
        }
        Ok(AuthorizationStatus::Unauthorized) => warning!(
            "{} has not connected Spotify. Run `spotlink connect --user {}`.",
            user_id,
            user_id
        ),
        Err(e) => error!("Cannot read stored tokens. Err: {}", e),
    }
}

async fn wait_for_authorization(app: &App, user_id: &str) -> bool {
    let start = Instant::now();

    while start.elapsed() < MAX_WAIT {
        if let Ok(AuthorizationStatus::Valid) = app.auth.authorization_status(user_id).await {
            return true;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    false
}
