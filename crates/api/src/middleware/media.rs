//! Signature check in front of locally served media files.

use std::sync::Arc;

use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;
use serene_core::error::CoreError;
use serene_core::media;

use crate::error::AppError;

/// Secret used to sign and verify media URLs.
#[derive(Clone)]
pub struct MediaSigningKey(pub Arc<str>);

#[derive(Debug, Deserialize)]
pub struct SignedMediaParams {
    expires: Option<String>,
    sig: Option<String>,
}

/// Reject requests for `/media/*` without a valid, unexpired signature.
///
/// Runs inside the nested media service, so the request path is the storage
/// key with a leading `/`.
pub async fn require_signed_media(
    State(MediaSigningKey(secret)): State<MediaSigningKey>,
    Query(params): Query<SignedMediaParams>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = request.uri().path().trim_start_matches('/');
    let expires = params.expires.as_deref().and_then(|e| e.parse().ok());

    media::verify(
        &secret,
        key,
        expires,
        params.sig.as_deref(),
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        tracing::debug!(key, error = %e, "Refused media request");
        AppError::Core(CoreError::Forbidden(e.to_string()))
    })?;

    Ok(next.run(request).await)
}
