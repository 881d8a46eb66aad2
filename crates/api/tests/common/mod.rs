#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use serene_api::auth::jwt::JwtConfig;
use serene_api::auth::password::hash_password;
use serene_api::billing::{CheckoutRequest, HostedSession, PaymentError, PaymentGateway};
use serene_api::config::{ServerConfig, StorageConfig, StripeConfig};
use serene_api::router::build_app_router;
use serene_api::state::AppState;
use serene_api::storage::LocalStorage;
use serene_core::types::DbId;
use serene_db::models::user::{CreateUser, User};
use serene_db::repositories::{ClienteRepo, UserRepo};

/// Webhook signing secret used by [`test_config`].
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Key that signs `/media` URLs in [`test_config`].
pub const MEDIA_SECRET: &str = "integration-media-secret";

/// Password given to every user created with [`create_user`].
pub const TEST_PASSWORD: &str = "calm-waters-42";

/// A running test application plus the fakes behind it.
pub struct TestApp {
    router: Router,
    pub pool: PgPool,
    pub payments: Arc<FakePayments>,
    pub storage_dir: tempfile::TempDir,
}

impl TestApp {
    /// A fresh handle to the router (cheap clone).
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build a test `ServerConfig` with safe defaults and local storage in `root`.
pub fn test_config(root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_url: "http://localhost:5173".to_string(),
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        },
        stripe: StripeConfig {
            secret_key: "sk_test_unused".to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            webhook_tolerance_secs: 300,
        },
        storage: StorageConfig::Local {
            root: root.to_path_buf(),
            public_base_url: "/media".to_string(),
            signing_secret: MEDIA_SECRET.to_string(),
        },
    }
}

/// Build the full application router (same middleware stack as production)
/// with a recording payment gateway and storage in a temporary directory.
pub async fn build_test_app(pool: PgPool) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("tempdir should be created");
    let config = test_config(storage_dir.path());
    let payments = Arc::new(FakePayments::default());

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        storage: Arc::new(LocalStorage::new(
            storage_dir.path().to_path_buf(),
            "/media".to_string(),
            MEDIA_SECRET.to_string(),
        )),
        payments: payments.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        pool,
        payments,
        storage_dir,
    }
}

// ---------------------------------------------------------------------------
// Fake payment gateway
// ---------------------------------------------------------------------------

/// Records every call and answers with predictable ids.
#[derive(Default)]
pub struct FakePayments {
    pub customers: Mutex<Vec<(String, DbId)>>,
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
    pub portals: Mutex<Vec<String>>,
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_customer(&self, email: &str, user_id: DbId) -> Result<String, PaymentError> {
        self.customers
            .lock()
            .unwrap()
            .push((email.to_string(), user_id));
        Ok(format!("cus_test_{user_id}"))
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<HostedSession, PaymentError> {
        self.checkouts.lock().unwrap().push(request.clone());
        Ok(HostedSession {
            id: "cs_test_1".to_string(),
            url: "https://checkout.test/cs_test_1".to_string(),
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        _return_url: &str,
    ) -> Result<HostedSession, PaymentError> {
        self.portals.lock().unwrap().push(customer_id.to_string());
        Ok(HostedSession {
            id: "bps_test_1".to_string(),
            url: "https://billing.test/bps_test_1".to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user (and profile row) with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    ClienteRepo::create_for_user(pool, user.id, None)
        .await
        .expect("profile creation should succeed");
    user
}

/// Log in through the API and return the access token.
pub async fn login(app: Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    let json = body_json(response).await;
    json["access_token"]
        .as_str()
        .expect("login response has access_token")
        .to_string()
}

/// Create a user with `role` and return `(user, access_token)`.
pub async fn user_with_token(test: &TestApp, email: &str, role: &str) -> (User, String) {
    let user = create_user(&test.pool, email, role).await;
    let token = login(test.app(), email).await;
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, empty_request("GET", uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request("GET", uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request("POST", uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("POST", uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request("PUT", uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request("DELETE", uri, Some(token))).await
}

/// POST a raw webhook body with an optional `Stripe-Signature` header.
pub async fn post_webhook(app: Router, payload: &[u8], signature: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/stripe/webhooks")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header("stripe-signature", sig);
    }
    send(app, builder.body(Body::from(payload.to_vec())).unwrap()).await
}

/// A single part of a multipart form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

/// POST a multipart form with a bearer token.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    parts: &[Part<'_>],
    token: &str,
) -> Response<Body> {
    const BOUNDARY: &str = "serene-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}
