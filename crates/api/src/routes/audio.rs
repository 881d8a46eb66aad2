//! Route definitions for the `/audio` library.

use axum::routing::get;
use axum::Router;

use crate::handlers::audio;
use crate::state::AppState;

/// Routes mounted at `/audio`.
///
/// ```text
/// GET /                -> list_audio
/// GET /categories      -> list_categories
/// GET /moods           -> list_moods
/// GET /{id}            -> get_audio
/// GET /{id}/stream     -> stream_audio
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(audio::list_audio))
        .route("/categories", get(audio::list_categories))
        .route("/moods", get(audio::list_moods))
        .route("/{id}", get(audio::get_audio))
        .route("/{id}/stream", get(audio::stream_audio))
}
