//! # API Module
//!
//! HTTP endpoints served by the local web server: the OAuth 2.0
//! authorization-code flow and a health check.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`authorize`] - `GET /authenticate-spotify?userId=` creates a state bound
//!   to the user and redirects the browser to Spotify's consent page.
//! - [`callback`] - `GET /authenticate-spotify/callback` is where Spotify sends
//!   the browser back with `code` and `state`. The state is consumed, the code
//!   is exchanged and the tokens are stored. The handler answers with a short
//!   HTML page naming the failing stage, if any.
//!
//! ### Monitoring
//!
//! - [`health`] - status, version and whether credentials are configured.
//!
//! ## Shared State
//!
//! Handlers receive the [`TokenLifecycleManager`] through an axum
//! [`Extension`](axum::Extension); they hold no state of their own.
//!
//! [`TokenLifecycleManager`]: crate::spotify::auth::TokenLifecycleManager

mod authorize;
mod callback;
mod health;

pub use authorize::authorize;
pub use callback::callback;
pub use health::health;

use askama::Template;
use axum::{http::StatusCode, response::Html};

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    title: &'a str,
    message: &'a str,
}

/// Minimal HTML page with a heading and one paragraph.
pub(crate) fn page(status: StatusCode, title: &str, message: &str) -> (StatusCode, Html<String>) {
    let template = PageTemplate { title, message };
    (status, Html(template.render().unwrap_or_default()))
}
