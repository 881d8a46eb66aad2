use std::path::PathBuf;

use serene_core::billing::SIGNATURE_TOLERANCE_SECS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development, except
/// the secrets (`JWT_SECRET`, `STRIPE_SECRET_KEY`, `STRIPE_WEBHOOK_SECRET`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public URL of the frontend, used for checkout/portal redirects.
    pub app_url: String,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Stripe credentials.
    pub stripe: StripeConfig,
    /// Object storage backend selection.
    pub storage: StorageConfig,
}

/// Stripe API and webhook configuration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_...`).
    pub secret_key: String,
    /// Webhook endpoint signing secret (`whsec_...`).
    pub webhook_secret: String,
    /// API base URL (default: `https://api.stripe.com/v1`).
    pub api_base: String,
    /// Accepted clock skew for webhook signatures, in seconds.
    pub webhook_tolerance_secs: i64,
}

/// Where uploaded audio objects live.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Files on local disk, served by this process under `/media`.
    Local {
        root: PathBuf,
        public_base_url: String,
        /// Key for the expiring signatures on media URLs.
        signing_secret: String,
    },
    /// A hosted object-storage REST endpoint.
    Http {
        base_url: String,
        bucket: String,
        service_key: String,
    },
}

/// Default Stripe API base URL.
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `APP_URL`              | `http://localhost:5173`    |
    ///
    /// # Panics
    ///
    /// Panics on unparsable numbers or missing secrets; misconfiguration
    /// should stop the server at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            app_url,
            jwt: JwtConfig::from_env(),
            stripe: StripeConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }
}

impl StripeConfig {
    /// Load Stripe configuration.
    ///
    /// | Env Var                         | Required | Default                      |
    /// |---------------------------------|----------|------------------------------|
    /// | `STRIPE_SECRET_KEY`             | **yes**  | --                           |
    /// | `STRIPE_WEBHOOK_SECRET`         | **yes**  | --                           |
    /// | `STRIPE_API_BASE`               | no       | `https://api.stripe.com/v1`  |
    /// | `STRIPE_WEBHOOK_TOLERANCE_SECS` | no       | `300`                        |
    pub fn from_env() -> Self {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .expect("STRIPE_SECRET_KEY must be set in the environment");
        let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .expect("STRIPE_WEBHOOK_SECRET must be set in the environment");
        assert!(!webhook_secret.is_empty(), "STRIPE_WEBHOOK_SECRET must not be empty");

        let api_base = std::env::var("STRIPE_API_BASE")
            .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.into())
            .trim_end_matches('/')
            .to_string();

        let webhook_tolerance_secs: i64 = std::env::var("STRIPE_WEBHOOK_TOLERANCE_SECS")
            .unwrap_or_else(|_| SIGNATURE_TOLERANCE_SECS.to_string())
            .parse()
            .expect("STRIPE_WEBHOOK_TOLERANCE_SECS must be a valid i64");

        Self {
            secret_key,
            webhook_secret,
            api_base,
            webhook_tolerance_secs,
        }
    }
}

impl StorageConfig {
    /// Load the storage backend selection.
    ///
    /// | Env Var                   | Default          | Used by  |
    /// |---------------------------|------------------|----------|
    /// | `STORAGE_BACKEND`         | `local`          | both     |
    /// | `STORAGE_LOCAL_DIR`       | `storage/media`  | `local`  |
    /// | `STORAGE_PUBLIC_BASE_URL` | `/media`         | `local`  |
    /// | `STORAGE_SIGNING_SECRET`  | `JWT_SECRET`     | `local`  |
    /// | `STORAGE_HTTP_URL`        | --               | `http`   |
    /// | `STORAGE_HTTP_BUCKET`     | `audio`          | `http`   |
    /// | `STORAGE_SERVICE_KEY`     | --               | `http`   |
    pub fn from_env() -> Self {
        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".into());
        match backend.as_str() {
            "local" => StorageConfig::Local {
                root: std::env::var("STORAGE_LOCAL_DIR")
                    .unwrap_or_else(|_| "storage/media".into())
                    .into(),
                public_base_url: std::env::var("STORAGE_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| "/media".into())
                    .trim_end_matches('/')
                    .to_string(),
                signing_secret: std::env::var("STORAGE_SIGNING_SECRET")
                    .or_else(|_| std::env::var("JWT_SECRET"))
                    .expect("STORAGE_SIGNING_SECRET or JWT_SECRET must be set"),
            },
            "http" => StorageConfig::Http {
                base_url: std::env::var("STORAGE_HTTP_URL")
                    .expect("STORAGE_HTTP_URL must be set when STORAGE_BACKEND=http")
                    .trim_end_matches('/')
                    .to_string(),
                bucket: std::env::var("STORAGE_HTTP_BUCKET").unwrap_or_else(|_| "audio".into()),
                service_key: std::env::var("STORAGE_SERVICE_KEY")
                    .expect("STORAGE_SERVICE_KEY must be set when STORAGE_BACKEND=http"),
            },
            other => panic!("Unknown STORAGE_BACKEND '{other}'. Must be 'local' or 'http'"),
        }
    }
}
