use crate::{
    app::App,
    error, info,
    server::{CALLBACK_PATH, start_api_server},
    warning,
};

pub async fn serve(app: App) {
    if !app.auth.is_configured() {
        warning!("Spotify is not configured; authorization requests will fail.");
    } else if !app.config.redirect_uri.ends_with(CALLBACK_PATH) {
        warning!(
            "Redirect URI {} does not end with {}.",
            app.config.redirect_uri,
            CALLBACK_PATH
        );
    }

    info!("Serving on http://{}", app.config.server_addr);
    if let Err(e) = start_api_server(app).await {
        error!("Server stopped. Err: {}", e);
    }
}
