//! Access and refresh tokens.
//!
//! An access token is a short-lived HS256 JWT naming the user, their role and
//! the plan in effect when it was issued. A refresh token is an opaque random
//! string handed to the client once; `sessions` keeps only its SHA-256 hash,
//! and each one can be exchanged exactly once.

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serene_core::hashing::sha256_hex;
use serene_core::types::{DbId, Timestamp};
use uuid::Uuid;

/// `iss` claim on every token this server signs.
pub const ISSUER: &str = "serene";

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 30;

/// Payload of an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// `"admin"` or `"user"`.
    pub role: String,
    /// `"free"` or `"premium"` at issue time.
    ///
    /// Lets clients show locked content without a round trip. Premium checks
    /// on the server re-read the user row, since a subscription can lapse or
    /// be upgraded while the token is live.
    pub plan: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 signing secret.
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or an expiry is not a
    /// positive integer.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            secret,
            access_token_expiry_mins: positive_env(
                "JWT_ACCESS_EXPIRY_MINS",
                DEFAULT_ACCESS_EXPIRY_MINS,
            ),
            refresh_token_expiry_days: positive_env(
                "JWT_REFRESH_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
            ),
        }
    }

    /// Access token lifetime, as reported to clients in `expires_in`.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }

    fn validation() -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation
    }
}

fn positive_env(name: &str, default: i64) -> i64 {
    let value: i64 = std::env::var(name)
        .map(|raw| raw.parse().unwrap_or_else(|_| panic!("{name} must be an integer")))
        .unwrap_or(default);
    assert!(value > 0, "{name} must be positive");
    value
}

/// Sign an access token for `user_id`, valid from `now`.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    plan: &str,
    now: Timestamp,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        plan: plan.to_string(),
        iss: ISSUER.to_string(),
        exp: now.timestamp() + config.access_ttl_secs(),
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Decode an access token, checking its signature, issuer and expiry.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )
    .map(|data| data.claims)
}

/// A freshly minted refresh token.
#[derive(Debug)]
pub struct IssuedRefreshToken {
    /// Sent to the client and never stored.
    pub token: String,
    /// What `sessions.refresh_token_hash` holds.
    pub hash: String,
    pub expires_at: Timestamp,
}

pub fn generate_refresh_token(now: Timestamp, config: &JwtConfig) -> IssuedRefreshToken {
    let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    IssuedRefreshToken {
        hash: hash_refresh_token(&token),
        token,
        expires_at: now + Duration::days(config.refresh_token_expiry_days),
    }
}

/// Lookup key for a refresh token presented by a client.
pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}
