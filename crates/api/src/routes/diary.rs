//! Route definitions for the `/diary` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::diary;
use crate::state::AppState;

/// Routes mounted at `/diary`.
///
/// `GET /pages/{date}` takes an ISO date, `DELETE /pages/{id}` a page id;
/// both share one path segment.
///
/// ```text
/// GET    /pages            -> list_pages
/// GET    /pages/{key}      -> get_page (date)
/// DELETE /pages/{key}      -> delete_page (id)
/// POST   /entries          -> create_entry
/// GET    /entries/{id}     -> get_entry
/// PUT    /entries/{id}     -> update_entry
/// DELETE /entries/{id}     -> delete_entry
/// GET    /moods            -> mood_summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pages", get(diary::list_pages))
        .route(
            "/pages/{key}",
            get(diary::get_page).delete(diary::delete_page),
        )
        .route("/entries", post(diary::create_entry))
        .route(
            "/entries/{id}",
            get(diary::get_entry)
                .put(diary::update_entry)
                .delete(diary::delete_entry),
        )
        .route("/moods", get(diary::mood_summary))
}
