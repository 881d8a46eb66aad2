//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`media::require_signed_media`] -- Guards locally served media files.

pub mod auth;
pub mod media;
pub mod rbac;
