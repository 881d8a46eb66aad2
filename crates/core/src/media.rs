//! Expiring signatures for media URLs.
//!
//! Stored objects are only reachable through a URL carrying `expires` (Unix
//! seconds) and `sig`, an HMAC-SHA256 over `"<key>:<expires>"`. The stream
//! endpoint issues these after its premium check; the media route verifies
//! them before serving a byte.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::hashing::{hex_decode, hex_encode};

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of an issued playback URL.
pub const PLAYBACK_URL_TTL_SECS: i64 = 3600;

/// Reasons a media URL is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaUrlError {
    #[error("Media URL is not signed")]
    Unsigned,

    #[error("Media URL has expired")]
    Expired,

    #[error("Media URL signature does not match")]
    Mismatch,
}

/// Hex signature for `key` valid until `expires`.
pub fn sign(secret: &str, key: &str, expires: i64) -> String {
    hex_encode(mac(secret, key, expires).finalize().into_bytes())
}

/// Query string (without `?`) granting access to `key` until `expires`.
pub fn signed_query(secret: &str, key: &str, expires: i64) -> String {
    format!("expires={expires}&sig={}", sign(secret, key, expires))
}

/// Check a presented `expires`/`sig` pair for `key` at `now`.
pub fn verify(
    secret: &str,
    key: &str,
    expires: Option<i64>,
    sig: Option<&str>,
    now: i64,
) -> Result<(), MediaUrlError> {
    let (Some(expires), Some(sig)) = (expires, sig) else {
        return Err(MediaUrlError::Unsigned);
    };
    let sig = hex_decode(sig).ok_or(MediaUrlError::Mismatch)?;
    mac(secret, key, expires)
        .verify_slice(&sig)
        .map_err(|_| MediaUrlError::Mismatch)?;
    if now > expires {
        return Err(MediaUrlError::Expired);
    }
    Ok(())
}

fn mac(secret: &str, key: &str, expires: i64) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(key.as_bytes());
    mac.update(b":");
    mac.update(expires.to_string().as_bytes());
    mac
}
