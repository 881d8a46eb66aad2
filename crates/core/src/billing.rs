//! Stripe webhook verification, event parsing and subscription reconciliation.
//!
//! The HTTP layer hands the raw request body and the `Stripe-Signature`
//! header to [`verify_signature`], parses the body with [`parse_event`], and
//! turns the resulting [`BillingEvent`] into a [`SubscriptionChange`] with
//! [`reconcile`]. Applying the change to the `users` row is the repository
//! layer's job.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::hashing::{hex_decode, hex_encode};
use crate::plans::{PLAN_FREE, PLAN_PREMIUM};
use crate::types::{DbId, Timestamp};

type HmacSha256 = Hmac<Sha256>;

/// Default tolerance between the signed timestamp and the local clock.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Metadata key carrying our internal user id on Stripe objects.
pub const METADATA_USER_ID: &str = "user_id";

// ---------------------------------------------------------------------------
// Event type names
// ---------------------------------------------------------------------------

pub const EVENT_CHECKOUT_COMPLETED: &str = "checkout.session.completed";
pub const EVENT_SUBSCRIPTION_CREATED: &str = "customer.subscription.created";
pub const EVENT_SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const EVENT_SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";
pub const EVENT_INVOICE_PAYMENT_SUCCEEDED: &str = "invoice.payment_succeeded";
pub const EVENT_INVOICE_PAID: &str = "invoice.paid";
pub const EVENT_INVOICE_PAYMENT_FAILED: &str = "invoice.payment_failed";

// ---------------------------------------------------------------------------
// Subscription statuses
// ---------------------------------------------------------------------------

/// Subscription statuses that keep premium access until the period ends.
pub const PREMIUM_STATUSES: &[&str] = &["active", "trialing", "past_due"];

/// Subscription statuses that end premium access immediately.
pub const TERMINAL_STATUSES: &[&str] = &["canceled", "unpaid", "incomplete_expired"];

// ---------------------------------------------------------------------------
// Signature verification
// ---------------------------------------------------------------------------

/// Reasons a webhook signature is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Signature header has no timestamp")]
    MissingTimestamp,

    #[error("Signature header has no v1 signature")]
    MissingSignature,

    #[error("Signature timestamp is outside the tolerance window")]
    OutsideTolerance,

    #[error("No signature matches the payload")]
    Mismatch,
}

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=<hex>...]`).
///
/// The signed message is `"<t>.<payload>"` under HMAC-SHA256 with the
/// endpoint secret. Any one matching `v1` entry is accepted. `now` is a Unix
/// timestamp in seconds.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for item in header.split(',') {
        let Some((key, value)) = item.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Some(bytes) = hex_decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    if (now - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::OutsideTolerance);
    }

    let mac = signed_mac(secret, timestamp, payload);
    if signatures
        .iter()
        .any(|sig| mac.clone().verify_slice(sig).is_ok())
    {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Produce a `Stripe-Signature` header value for `payload` signed at `timestamp`.
///
/// Used to sign test fixtures and local replays of webhook payloads.
pub fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let sig = signed_mac(secret, timestamp, payload).finalize().into_bytes();
    format!("t={timestamp},v1={}", hex_encode(sig))
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

// ---------------------------------------------------------------------------
// Wire types (only the fields we read)
// ---------------------------------------------------------------------------

/// Envelope of every webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: i64,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct List<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    client_reference_id: Option<String>,
    customer: Option<String>,
    subscription: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionObject {
    id: String,
    customer: Option<String>,
    status: String,
    current_period_end: Option<i64>,
    #[serde(default)]
    metadata: HashMap<String, String>,
    items: Option<List<SubscriptionItem>>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    current_period_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct InvoiceObject {
    customer: Option<String>,
    subscription: Option<String>,
    lines: Option<List<InvoiceLine>>,
    period_end: Option<i64>,
    subscription_details: Option<SubscriptionDetails>,
}

#[derive(Debug, Deserialize)]
struct InvoiceLine {
    period: Option<Period>,
}

#[derive(Debug, Deserialize)]
struct Period {
    end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionDetails {
    #[serde(default)]
    metadata: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Domain events
// ---------------------------------------------------------------------------

/// How to find the user a billing event belongs to.
///
/// `user_id` comes from our own metadata; `customer_id` is the fallback
/// lookup key when metadata is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRef {
    pub user_id: Option<DbId>,
    pub customer_id: Option<String>,
}

impl UserRef {
    fn new(user_id: Option<DbId>, customer_id: Option<String>) -> Self {
        Self {
            user_id,
            customer_id,
        }
    }
}

/// A webhook event reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEvent {
    CheckoutCompleted {
        user: UserRef,
        subscription_id: Option<String>,
    },
    SubscriptionChanged {
        user: UserRef,
        subscription_id: String,
        status: String,
        current_period_end: Option<i64>,
    },
    SubscriptionDeleted {
        user: UserRef,
        subscription_id: String,
    },
    InvoicePaid {
        user: UserRef,
        subscription_id: Option<String>,
        period_end: Option<i64>,
    },
    InvoicePaymentFailed {
        user: UserRef,
        subscription_id: Option<String>,
    },
    /// An event type we do not act on.
    Ignored { event_type: String },
}

/// Errors raised while decoding a webhook body.
#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("Malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse a raw webhook body into its envelope and domain event.
pub fn parse_event(payload: &[u8]) -> Result<(StripeEvent, BillingEvent), EventParseError> {
    let event: StripeEvent = serde_json::from_slice(payload)?;
    let billing = to_billing_event(&event)?;
    Ok((event, billing))
}

fn to_billing_event(event: &StripeEvent) -> Result<BillingEvent, serde_json::Error> {
    let object = event.data.object.clone();
    let billing = match event.event_type.as_str() {
        EVENT_CHECKOUT_COMPLETED => {
            let session: CheckoutSessionObject = serde_json::from_value(object)?;
            let user_id = metadata_user_id(&session.metadata)
                .or_else(|| session.client_reference_id.as_deref().and_then(parse_user_id));
            BillingEvent::CheckoutCompleted {
                user: UserRef::new(user_id, session.customer),
                subscription_id: session.subscription,
            }
        }
        EVENT_SUBSCRIPTION_CREATED | EVENT_SUBSCRIPTION_UPDATED => {
            let sub: SubscriptionObject = serde_json::from_value(object)?;
            let item_period_end = sub
                .items
                .and_then(|items| items.data.into_iter().next())
                .and_then(|item| item.current_period_end);
            BillingEvent::SubscriptionChanged {
                user: UserRef::new(metadata_user_id(&sub.metadata), sub.customer),
                subscription_id: sub.id,
                status: sub.status,
                current_period_end: sub.current_period_end.or(item_period_end),
            }
        }
        EVENT_SUBSCRIPTION_DELETED => {
            let sub: SubscriptionObject = serde_json::from_value(object)?;
            BillingEvent::SubscriptionDeleted {
                user: UserRef::new(metadata_user_id(&sub.metadata), sub.customer),
                subscription_id: sub.id,
            }
        }
        EVENT_INVOICE_PAYMENT_SUCCEEDED | EVENT_INVOICE_PAID => {
            let invoice: InvoiceObject = serde_json::from_value(object)?;
            let line_end = invoice
                .lines
                .as_ref()
                .and_then(|l| l.data.iter().filter_map(|line| line.period.as_ref()?.end).max());
            BillingEvent::InvoicePaid {
                user: invoice_user(&invoice),
                subscription_id: invoice.subscription,
                period_end: line_end.or(invoice.period_end),
            }
        }
        EVENT_INVOICE_PAYMENT_FAILED => {
            let invoice: InvoiceObject = serde_json::from_value(object)?;
            BillingEvent::InvoicePaymentFailed {
                user: invoice_user(&invoice),
                subscription_id: invoice.subscription,
            }
        }
        other => BillingEvent::Ignored {
            event_type: other.to_string(),
        },
    };
    Ok(billing)
}

fn invoice_user(invoice: &InvoiceObject) -> UserRef {
    let user_id = invoice
        .subscription_details
        .as_ref()
        .and_then(|d| metadata_user_id(&d.metadata));
    UserRef::new(user_id, invoice.customer.clone())
}

fn metadata_user_id(metadata: &HashMap<String, String>) -> Option<DbId> {
    metadata.get(METADATA_USER_ID).and_then(|v| parse_user_id(v))
}

fn parse_user_id(value: &str) -> Option<DbId> {
    value.trim().parse().ok()
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Column updates to apply to a user row. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionChange {
    pub user: UserRef,
    pub plan: Option<&'static str>,
    pub subscription_id: Option<String>,
    pub subscription_status: Option<String>,
    pub expires_at: Option<Timestamp>,
    /// Clear `subscription_id` and `subscription_expires_at`.
    pub clear_subscription: bool,
    /// Creation time of the event. A row already updated by a newer event
    /// is left alone.
    pub event_at: Option<Timestamp>,
    /// Apply only while this is the user's current subscription (or the user
    /// has never had one).
    pub for_subscription: Option<String>,
}

impl SubscriptionChange {
    /// Stamp the change with the event's `created` time (Unix seconds).
    /// Non-positive values mean the event carried no time.
    #[must_use]
    pub fn at_event_time(mut self, created: i64) -> Self {
        self.event_at = (created > 0).then(|| unix_to_timestamp(created)).flatten();
        self
    }
}

/// Decide which column updates a billing event implies.
///
/// Returns `None` for events that change nothing.
pub fn reconcile(event: &BillingEvent) -> Option<SubscriptionChange> {
    match event {
        BillingEvent::CheckoutCompleted {
            user,
            subscription_id,
        } => Some(SubscriptionChange {
            user: user.clone(),
            plan: Some(PLAN_PREMIUM),
            subscription_id: subscription_id.clone(),
            subscription_status: Some("active".into()),
            ..Default::default()
        }),
        BillingEvent::SubscriptionChanged {
            user,
            subscription_id,
            status,
            current_period_end,
            ..
        } => {
            let status_str = status.as_str();
            if PREMIUM_STATUSES.contains(&status_str) {
                Some(SubscriptionChange {
                    user: user.clone(),
                    plan: Some(PLAN_PREMIUM),
                    subscription_id: Some(subscription_id.clone()),
                    subscription_status: Some(status.clone()),
                    expires_at: current_period_end.and_then(unix_to_timestamp),
                    ..Default::default()
                })
            } else if TERMINAL_STATUSES.contains(&status_str) {
                Some(SubscriptionChange {
                    user: user.clone(),
                    plan: Some(PLAN_FREE),
                    subscription_status: Some(status.clone()),
                    clear_subscription: true,
                    ..Default::default()
                })
            } else {
                // incomplete / paused: record the status, leave access alone.
                Some(SubscriptionChange {
                    user: user.clone(),
                    subscription_id: Some(subscription_id.clone()),
                    subscription_status: Some(status.clone()),
                    ..Default::default()
                })
            }
        }
        BillingEvent::SubscriptionDeleted { user, .. } => Some(SubscriptionChange {
            user: user.clone(),
            plan: Some(PLAN_FREE),
            subscription_status: Some("canceled".into()),
            clear_subscription: true,
            ..Default::default()
        }),
        BillingEvent::InvoicePaid {
            user,
            subscription_id,
            period_end,
        } => {
            // One-off invoices carry no subscription and grant nothing.
            let subscription_id = subscription_id.clone()?;
            Some(SubscriptionChange {
                user: user.clone(),
                plan: Some(PLAN_PREMIUM),
                subscription_id: Some(subscription_id.clone()),
                subscription_status: Some("active".into()),
                expires_at: period_end.and_then(unix_to_timestamp),
                for_subscription: Some(subscription_id),
                ..Default::default()
            })
        }
        BillingEvent::InvoicePaymentFailed {
            user,
            subscription_id,
        } => {
            let subscription_id = subscription_id.clone()?;
            Some(SubscriptionChange {
                user: user.clone(),
                subscription_status: Some("past_due".into()),
                for_subscription: Some(subscription_id),
                ..Default::default()
            })
        }
        BillingEvent::Ignored { .. } => None,
    }
}

fn unix_to_timestamp(secs: i64) -> Option<Timestamp> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}
