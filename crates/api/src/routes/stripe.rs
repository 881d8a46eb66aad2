//! Route definitions for `/stripe`.

use axum::routing::post;
use axum::Router;

use crate::handlers::stripe;
use crate::state::AppState;

/// Routes mounted at `/stripe`.
///
/// ```text
/// POST /checkout   -> create_checkout (requires auth)
/// POST /portal     -> create_portal (requires auth)
/// POST /webhooks   -> webhook (signature verified)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(stripe::create_checkout))
        .route("/portal", post(stripe::create_portal))
        .route("/webhooks", post(stripe::webhook))
}
