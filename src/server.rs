use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tracing::info;

use crate::{Res, api, app::App};

/// Path Spotify redirects back to; the configured redirect URI must end with it.
pub const CALLBACK_PATH: &str = "/authenticate-spotify/callback";

pub fn router(app: &App) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/authenticate-spotify", get(api::authorize))
        .route(CALLBACK_PATH, get(api::callback))
        .layer(Extension(Arc::clone(&app.auth)))
}

/// Binds `SERVER_ADDRESS` and serves until the process ends.
pub async fn start_api_server(app: App) -> Res<()> {
    let addr = SocketAddr::from_str(&app.config.server_addr)
        .map_err(|e| format!("invalid server address {}: {}", app.config.server_addr, e))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening for authorization callbacks");
    axum::serve(listener, router(&app)).await?;
    Ok(())
}
