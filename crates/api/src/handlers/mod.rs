//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource. Handlers
//! validate input with `serene_core`, delegate to the repositories in
//! `serene_db` and map errors via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod audio;
pub mod audio_admin;
pub mod auth;
pub mod diary;
pub mod group_admin;
pub mod groups;
pub mod health;
pub mod pricing_plans;
pub mod profile;
pub mod stripe;
