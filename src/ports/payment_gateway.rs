//! Payment gateway port for external payment processing.
//!
//! Defines the contract for the hosted-checkout payment provider (e.g.
//! Stripe). The gateway owns checkout sessions and is the authoritative
//! source of truth for payment completion; this service only ever reads
//! session state, never caches it beyond the derived donation row.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode};

/// Port for payment gateway integrations.
///
/// Implementations must be safe to retry: session creation is requested at
/// most once per checkout, and both read paths (lookup and webhook) are free
/// of side effects.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session carrying the donation metadata.
    ///
    /// Returns the gateway's opaque session reference and the URL the donor
    /// is redirected to.
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<GatewaySession, GatewayError>;

    /// Retrieve the authoritative state of a checkout session.
    ///
    /// Returns `None` when the gateway does not know the reference.
    async fn retrieve_session(
        &self,
        session_ref: &str,
    ) -> Result<Option<GatewaySession>, GatewayError>;

    /// Verify a webhook signature over the raw body and parse the event.
    ///
    /// Returns the parsed event if the signature is valid; any verification
    /// failure must be reported before the payload is interpreted.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayEvent, GatewayError>;
}

/// Request to create a hosted checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    /// Amount in minor units (cents).
    pub amount_minor: i64,

    /// Line-item description shown on the hosted payment page.
    pub description: String,

    /// Donor email for pre-fill.
    pub customer_email: String,

    /// Donation metadata embedded in the session (string-only map).
    pub metadata: HashMap<String, String>,

    /// URL to redirect to after successful payment.
    pub success_url: String,

    /// URL to redirect to after abandoned checkout.
    pub cancel_url: String,
}

/// Payment status of a checkout session, as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment not yet completed.
    Unpaid,
    /// Payment completed. Terminal success.
    Paid,
    /// Session expired without payment. Terminal failure.
    Expired,
}

impl PaymentStatus {
    /// Parse the gateway's wire value; unknown values map to `Unpaid` so an
    /// unrecognized status can never trigger a ledger write.
    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => PaymentStatus::Paid,
            "expired" => PaymentStatus::Expired,
            _ => PaymentStatus::Unpaid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Expired => "expired",
        }
    }
}

/// Checkout session state as observed at the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySession {
    /// Opaque session reference (the donation idempotency key).
    pub id: String,

    /// URL of the hosted payment page, present while the session is open.
    pub url: Option<String>,

    /// Authoritative payment status.
    pub payment_status: PaymentStatus,

    /// Donation metadata as stored on the session.
    pub metadata: HashMap<String, String>,
}

/// Webhook event types this service reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayEventType {
    /// Checkout completed; the session is paid.
    CheckoutSessionCompleted,
    /// Checkout session expired without payment.
    CheckoutSessionExpired,
    /// Any other event type; acknowledged but not processed.
    Unknown(String),
}

/// Signature-verified webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEvent {
    /// Event id from the gateway.
    pub id: String,

    /// Parsed event type.
    pub event_type: GatewayEventType,

    /// The checkout session carried by the event, when the event concerns one.
    pub session: Option<GatewaySession>,

    /// When the event occurred (Unix timestamp).
    pub created_at: i64,
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    /// Create an invalid webhook error.
    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidWebhook, message)
    }

    /// Create a provider API error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        let code = match err.code {
            GatewayErrorCode::InvalidWebhook => ErrorCode::InvalidWebhookSignature,
            _ => ErrorCode::PaymentGatewayError,
        };
        DomainError::new(code, err.message)
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue or timeout.
    NetworkError,

    /// Gateway rate limit exceeded.
    RateLimitExceeded,

    /// Invalid webhook signature or payload.
    InvalidWebhook,

    /// Gateway API error.
    ProviderError,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError | GatewayErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            GatewayErrorCode::InvalidWebhook => "invalid_webhook",
            GatewayErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
