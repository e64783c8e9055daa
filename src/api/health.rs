use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::spotify::auth::TokenLifecycleManager;

pub async fn health(Extension(auth): Extension<Arc<TokenLifecycleManager>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "configured": auth.is_configured(),
    }))
}
