//! Stripe REST client (form-encoded requests, bearer secret key).

use async_trait::async_trait;
use serde::Deserialize;
use serene_core::billing::METADATA_USER_ID;
use serene_core::types::DbId;

use super::{CheckoutRequest, HostedSession, PaymentError, PaymentGateway};
use crate::config::StripeConfig;

pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct CustomerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeClient {
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, PaymentError> {
        let resp = self
            .client
            .post(format!("{}/{path}", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_slice(&body).map_err(|e| PaymentError::Decode(e.to_string()))
    }
}

fn session(resp: SessionResponse) -> Result<HostedSession, PaymentError> {
    let url = resp
        .url
        .ok_or_else(|| PaymentError::Decode(format!("session {} has no url", resp.id)))?;
    Ok(HostedSession { id: resp.id, url })
}

/// Form fields for a subscription checkout. The user id is written to the
/// session and to the subscription so every later event can be attributed.
fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let user_id = request.user_id.to_string();
    vec![
        ("mode".into(), "subscription".into()),
        ("customer".into(), request.customer_id.clone()),
        ("line_items[0][price]".into(), request.price_id.clone()),
        ("line_items[0][quantity]".into(), "1".into()),
        ("success_url".into(), request.success_url.clone()),
        ("cancel_url".into(), request.cancel_url.clone()),
        ("client_reference_id".into(), user_id.clone()),
        (format!("metadata[{METADATA_USER_ID}]"), user_id.clone()),
        (
            format!("subscription_data[metadata][{METADATA_USER_ID}]"),
            user_id,
        ),
    ]
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_customer(&self, email: &str, user_id: DbId) -> Result<String, PaymentError> {
        let form = vec![
            ("email".to_string(), email.to_string()),
            (format!("metadata[{METADATA_USER_ID}]"), user_id.to_string()),
        ];
        let customer: CustomerResponse = self.post_form("customers", &form).await?;
        tracing::info!(user_id, customer_id = %customer.id, "Created Stripe customer");
        Ok(customer.id)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<HostedSession, PaymentError> {
        let resp: SessionResponse = self
            .post_form("checkout/sessions", &checkout_form(request))
            .await?;
        session(resp)
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<HostedSession, PaymentError> {
        let form = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("return_url".to_string(), return_url.to_string()),
        ];
        let resp: SessionResponse = self.post_form("billing_portal/sessions", &form).await?;
        session(resp)
    }
}
