//! Route definitions for the `/admin` console.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serene_core::audio::MAX_AUDIO_BYTES;

use crate::handlers::{admin, audio_admin, group_admin, pricing_plans};
use crate::state::AppState;

/// Headroom over the file size for the other multipart fields and framing.
const UPLOAD_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Routes mounted at `/admin`. Every handler requires the `admin` role.
///
/// ```text
/// GET    /stats                                  -> stats
/// GET    /users                                  -> list_users
/// PUT    /users/{id}                             -> update_user
/// POST   /audio                                  -> upload_audio (multipart)
/// PUT    /audio/{id}                             -> update_audio
/// DELETE /audio/{id}                             -> delete_audio
/// POST   /audio/categories                       -> create_category
/// PUT    /audio/categories/{id}                  -> update_category
/// DELETE /audio/categories/{id}                  -> delete_category
/// POST   /audio/moods                            -> create_mood
/// PUT    /audio/moods/{id}                       -> update_mood
/// DELETE /audio/moods/{id}                       -> delete_mood
/// GET    /groups                                 -> list_groups
/// POST   /groups                                 -> create_group
/// GET    /groups/{id}                            -> get_group
/// PUT    /groups/{id}                            -> update_group
/// DELETE /groups/{id}                            -> delete_group
/// GET    /groups/{id}/participants               -> list_participants
/// POST   /groups/{id}/participants               -> add_participant
/// DELETE /groups/{id}/participants/{user_id}     -> remove_participant
/// GET    /pricing-plans                          -> list_all
/// POST   /pricing-plans                          -> create_plan
/// PUT    /pricing-plans/{id}                     -> update_plan
/// DELETE /pricing-plans/{id}                     -> delete_plan
/// ```
pub fn router() -> Router<AppState> {
    let upload = Router::new()
        .route("/audio", post(audio_admin::upload_audio))
        .layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES + UPLOAD_OVERHEAD_BYTES));

    Router::new()
        .route("/stats", get(admin::stats))
        .route("/users", get(admin::list_users))
        .route("/users/{id}", put(admin::update_user))
        .merge(upload)
        .route(
            "/audio/{id}",
            put(audio_admin::update_audio).delete(audio_admin::delete_audio),
        )
        .route("/audio/categories", post(audio_admin::create_category))
        .route(
            "/audio/categories/{id}",
            put(audio_admin::update_category).delete(audio_admin::delete_category),
        )
        .route("/audio/moods", post(audio_admin::create_mood))
        .route(
            "/audio/moods/{id}",
            put(audio_admin::update_mood).delete(audio_admin::delete_mood),
        )
        .route(
            "/groups",
            get(group_admin::list_groups).post(group_admin::create_group),
        )
        .route(
            "/groups/{id}",
            get(group_admin::get_group)
                .put(group_admin::update_group)
                .delete(group_admin::delete_group),
        )
        .route(
            "/groups/{id}/participants",
            get(group_admin::list_participants).post(group_admin::add_participant),
        )
        .route(
            "/groups/{id}/participants/{user_id}",
            delete(group_admin::remove_participant),
        )
        .route(
            "/pricing-plans",
            get(pricing_plans::list_all).post(pricing_plans::create_plan),
        )
        .route(
            "/pricing-plans/{id}",
            put(pricing_plans::update_plan).delete(pricing_plans::delete_plan),
        )
}
