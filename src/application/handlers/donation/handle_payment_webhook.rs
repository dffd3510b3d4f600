//! HandlePaymentWebhookHandler - gateway push entry point for reconciliation.

use std::sync::Arc;

use crate::domain::donation::{Donation, DonationError};
use crate::ports::{DonationRepository, GatewayEventType, PaymentGateway, UserDirectory};

use super::confirm_donation::{ConfirmDonationHandler, ConfirmOutcome};

/// Command carrying the raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as received (signature covers these bytes).
    pub payload: Vec<u8>,
    /// Provider signature header value.
    pub signature: String,
}

/// Result of processing a webhook delivery.
#[derive(Debug, Clone)]
pub enum HandleWebhookResult {
    /// Checkout completed and this delivery recorded the donation.
    DonationRecorded(Donation),
    /// Checkout completed but the donation was already recorded
    /// (earlier delivery or the polling endpoint won).
    AlreadyRecorded(Donation),
    /// Event verified and acknowledged; no ledger action required.
    Acknowledged,
    /// Unknown event type; acknowledged without processing.
    Ignored,
}

/// Handler for signature-verified gateway webhooks.
///
/// Verification failures are rejected before any ledger access. Processing
/// failures surface as retryable errors so the gateway redelivers; the
/// idempotent confirm makes redelivery safe.
pub struct HandlePaymentWebhookHandler {
    gateway: Arc<dyn PaymentGateway>,
    confirm: ConfirmDonationHandler,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        donations: Arc<dyn DonationRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        let confirm = ConfirmDonationHandler::new(gateway.clone(), donations, users);
        Self { gateway, confirm }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandleWebhookResult, DonationError> {
        // 1. Verify the signature over the raw body; reject before touching
        //    the ledger
        let event = self
            .gateway
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Webhook signature verification failed");
                DonationError::invalid_webhook_signature()
            })?;

        // 2. Only checkout-completed events reach the confirm operation
        match event.event_type {
            GatewayEventType::CheckoutSessionCompleted => {
                let session = event.session.as_ref().ok_or_else(|| {
                    DonationError::infrastructure(format!(
                        "Event {} has no checkout session payload",
                        event.id
                    ))
                })?;

                match self.confirm.confirm(session).await? {
                    ConfirmOutcome::Confirmed(donation) => {
                        Ok(HandleWebhookResult::DonationRecorded(donation))
                    }
                    ConfirmOutcome::AlreadyConfirmed(donation) => {
                        tracing::debug!(
                            session_ref = %session.id,
                            "Webhook for already-confirmed session"
                        );
                        Ok(HandleWebhookResult::AlreadyRecorded(donation))
                    }
                    // Completed event whose embedded session is not paid:
                    // acknowledge without writing
                    ConfirmOutcome::NotPaid => Ok(HandleWebhookResult::Acknowledged),
                }
            }
            GatewayEventType::CheckoutSessionExpired => {
                tracing::debug!(event_id = %event.id, "Checkout session expired");
                Ok(HandleWebhookResult::Acknowledged)
            }
            GatewayEventType::Unknown(ref event_type) => {
                tracing::debug!(event_id = %event.id, %event_type, "Ignoring webhook event");
                Ok(HandleWebhookResult::Ignored)
            }
        }
    }
}
