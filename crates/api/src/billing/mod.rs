//! Outbound calls to the payment processor.
//!
//! Handlers hold an `Arc<dyn PaymentGateway>` so integration tests can swap in
//! a recording fake. Webhook verification and reconciliation are pure and
//! live in [`serene_core::billing`].

pub mod stripe;

use async_trait::async_trait;
use serde::Serialize;
use serene_core::types::DbId;

pub use stripe::StripeClient;

/// Errors raised while talking to the payment processor.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected payment API response: {0}")]
    Decode(String),
}

/// Parameters for a hosted subscription checkout.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_id: String,
    pub price_id: String,
    pub user_id: DbId,
    pub success_url: String,
    pub cancel_url: String,
}

/// A hosted page the client is redirected to.
#[derive(Debug, Clone, Serialize)]
pub struct HostedSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a customer for `email`, tagged with our user id. Returns the customer id.
    async fn create_customer(&self, email: &str, user_id: DbId) -> Result<String, PaymentError>;

    /// Start a subscription checkout.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<HostedSession, PaymentError>;

    /// Open the self-service billing portal for a customer.
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<HostedSession, PaymentError>;
}
