pub mod admin;
pub mod audio;
pub mod auth;
pub mod diary;
pub mod health;
pub mod profile;
pub mod stripe;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   create account (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user (requires auth)
///
/// /profile                                         get, update own profile
/// /profile/password                                change password (PUT)
///
/// /diary/pages                                     list own pages
/// /diary/pages/{date}                              page with entries (GET)
/// /diary/pages/{id}                                delete page (DELETE)
/// /diary/entries                                   create entry (quota)
/// /diary/entries/{id}                              get, update, delete entry
/// /diary/moods                                     daily mood summary
///
/// /audio                                           library listing
/// /audio/categories                                categories
/// /audio/moods                                     moods
/// /audio/{id}                                      metadata
/// /audio/{id}/stream                               playback url (premium gated)
///
/// /groups                                          caller's groups
/// /pricing-plans                                   active plans (public)
///
/// /stripe/checkout                                 checkout session
/// /stripe/portal                                   billing portal session
/// /stripe/webhooks                                 signed event feed (public)
///
/// /admin/stats                                     dashboard counts
/// /admin/users                                     list users
/// /admin/users/{id}                                update role/plan/active
/// /admin/audio                                     upload (multipart POST)
/// /admin/audio/{id}                                update, delete
/// /admin/audio/categories                          create
/// /admin/audio/categories/{id}                     update, delete
/// /admin/audio/moods                               create
/// /admin/audio/moods/{id}                          update, delete
/// /admin/groups                                    list, create
/// /admin/groups/{id}                               get, update, delete
/// /admin/groups/{id}/participants                  list, add
/// /admin/groups/{id}/participants/{user_id}        remove
/// /admin/pricing-plans                             list, create
/// /admin/pricing-plans/{id}                        update, deactivate
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/diary", diary::router())
        .nest("/audio", audio::router())
        .route("/groups", get(handlers::groups::my_groups))
        .route(
            "/pricing-plans",
            get(handlers::pricing_plans::list_active),
        )
        .nest("/stripe", stripe::router())
        .nest("/admin", admin::router())
}
