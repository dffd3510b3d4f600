//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port over the Stripe API: one-time-payment
//! checkout sessions, session retrieval for the polling confirmation path,
//! and webhook signature verification for the push path.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::ports::{
    CheckoutSessionRequest, GatewayError, GatewayEvent, GatewayEventType, GatewaySession,
    PaymentGateway, PaymentStatus,
};

use super::webhook_types::{
    hex_encode, SignatureHeader, StripeCheckoutSession, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Currency for donation checkouts.
const CHECKOUT_CURRENCY: &str = "usd";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe payment gateway adapter.
pub struct StripeGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Verify webhook signature using HMAC-SHA256.
    fn verify_signature(
        &self,
        payload: &[u8],
        header: &SignatureHeader,
    ) -> Result<(), GatewayError> {
        // 1. Validate timestamp (prevent replay attacks)
        let now = chrono::Utc::now().timestamp();
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                age_secs = age,
                "Webhook event too old"
            );
            return Err(GatewayError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event timestamp in future"
            );
            return Err(GatewayError::invalid_webhook("Event timestamp in future"));
        }

        // 2. Compute expected signature over `timestamp.payload`
        let signed_payload = format!(
            "{}.{}",
            header.timestamp,
            String::from_utf8_lossy(payload)
        );

        let mut mac = HmacSha256::new_from_slice(
            self.config.webhook_secret.expose_secret().as_bytes(),
        )
        .expect("HMAC can take key of any size");

        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();

        // 3. Constant-time comparison
        let expected_bytes: &[u8] = expected.as_slice();
        let provided_bytes: &[u8] = &header.v1_signature;

        if expected_bytes.len() != provided_bytes.len()
            || expected_bytes.ct_eq(provided_bytes).unwrap_u8() != 1
        {
            tracing::warn!(
                expected_signature = hex_encode(expected_bytes),
                "Invalid webhook signature"
            );
            return Err(GatewayError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    /// Parse a verified webhook payload into a gateway event.
    fn parse_event(&self, payload: &[u8]) -> Result<GatewayEvent, GatewayError> {
        let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            GatewayError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        let event_type = match stripe_event.event_type.as_str() {
            "checkout.session.completed" => GatewayEventType::CheckoutSessionCompleted,
            "checkout.session.expired" => GatewayEventType::CheckoutSessionExpired,
            other => GatewayEventType::Unknown(other.to_string()),
        };

        // Checkout events carry the session object; the confirm path needs it
        let session = match event_type {
            GatewayEventType::CheckoutSessionCompleted
            | GatewayEventType::CheckoutSessionExpired => {
                let stripe_session: StripeCheckoutSession =
                    serde_json::from_value(stripe_event.data.object.clone()).map_err(|e| {
                        GatewayError::invalid_webhook(format!("Invalid checkout session: {}", e))
                    })?;
                Some(to_gateway_session(stripe_session))
            }
            GatewayEventType::Unknown(_) => None,
        };

        Ok(GatewayEvent {
            id: stripe_event.id,
            event_type,
            session,
            created_at: stripe_event.created,
        })
    }

    async fn read_error_body(response: reqwest::Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

/// Convert a Stripe session to the gateway port type.
fn to_gateway_session(session: StripeCheckoutSession) -> GatewaySession {
    let payment_status = PaymentStatus::parse(session.effective_payment_status());
    GatewaySession {
        id: session.id,
        url: session.url,
        payment_status,
        metadata: session.metadata,
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<GatewaySession, GatewayError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("customer_email".to_string(), request.customer_email),
            (
                "line_items[0][price_data][currency]".to_string(),
                CHECKOUT_CURRENCY.to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.amount_minor.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                request.description,
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), request.success_url),
            ("cancel_url".to_string(), request.cancel_url),
        ];

        for (key, value) in &request.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = Self::read_error_body(response).await;
            tracing::error!(error = %error_text, "Stripe create checkout session failed");
            return Err(GatewayError::provider(format!(
                "Stripe API error: {}",
                error_text
            )));
        }

        let stripe_session: StripeCheckoutSession = response.json().await.map_err(|e| {
            GatewayError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok(to_gateway_session(stripe_session))
    }

    async fn retrieve_session(
        &self,
        session_ref: &str,
    ) -> Result<Option<GatewaySession>, GatewayError> {
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_ref
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let error_text = Self::read_error_body(response).await;
            return Err(GatewayError::provider(format!(
                "Stripe API error: {}",
                error_text
            )));
        }

        let stripe_session: StripeCheckoutSession = response.json().await.map_err(|e| {
            GatewayError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok(Some(to_gateway_session(stripe_session)))
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayEvent, GatewayError> {
        // 1. Parse signature header
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            GatewayError::invalid_webhook(e.to_string())
        })?;

        // 2. Verify signature (includes timestamp validation)
        self.verify_signature(payload, &header)?;

        // 3. Parse the event
        let event = self.parse_event(payload)?;

        tracing::info!(
            event_id = %event.id,
            event_type = ?event.event_type,
            "Webhook signature verified"
        );

        Ok(event)
    }
}
