//! ConfirmDonationHandler - the idempotent donation confirmation.
//!
//! Both reconciliation entry points converge here: the browser polling the
//! status-check endpoint after redirect, and the gateway pushing a webhook
//! event. Either may arrive first, both may arrive, or only one.
//!
//! ## Race Condition Handling
//!
//! The ledger pre-check is only a fast path. The real guard is the storage
//! unique constraint on `session_ref`: when two confirmations race, the
//! first insert wins, the loser gets `RecordOutcome::AlreadyRecorded` and
//! resolves to the row the winner created. The donation insert and the
//! project funding increment are one atomic unit inside the repository, so
//! funding is incremented exactly once per session.

use std::sync::Arc;

use crate::domain::donation::{Donation, DonationError, SessionMetadata};
use crate::ports::{
    DonationRepository, GatewaySession, PaymentGateway, PaymentStatus, RecordOutcome,
    UserDirectory,
};

/// Command to confirm a checkout session by reference (polling entry point).
#[derive(Debug, Clone)]
pub struct ConfirmDonationCommand {
    /// Gateway session reference from the success-page query string.
    pub session_ref: String,
}

/// Outcome of an idempotent confirmation.
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    /// This call recorded the donation and incremented project funding.
    Confirmed(Donation),
    /// The session was already confirmed; the existing donation is returned.
    AlreadyConfirmed(Donation),
    /// The session is not paid; nothing was written.
    NotPaid,
}

impl ConfirmOutcome {
    /// The donation, when the session has been confirmed by anyone.
    pub fn donation(&self) -> Option<&Donation> {
        match self {
            ConfirmOutcome::Confirmed(d) | ConfirmOutcome::AlreadyConfirmed(d) => Some(d),
            ConfirmOutcome::NotPaid => None,
        }
    }
}

/// Result of a polling confirmation: the authoritative session state plus
/// what the confirmation did.
#[derive(Debug, Clone)]
pub struct ConfirmDonationResult {
    pub session: GatewaySession,
    pub outcome: ConfirmOutcome,
}

/// Handler for the idempotent confirm operation.
///
/// Cheap to clone; the webhook handler holds one alongside its own entry
/// point.
#[derive(Clone)]
pub struct ConfirmDonationHandler {
    gateway: Arc<dyn PaymentGateway>,
    donations: Arc<dyn DonationRepository>,
    users: Arc<dyn UserDirectory>,
}

impl ConfirmDonationHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        donations: Arc<dyn DonationRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            gateway,
            donations,
            users,
        }
    }

    /// Polling entry point: look the session up at the gateway, then confirm.
    pub async fn handle(
        &self,
        cmd: ConfirmDonationCommand,
    ) -> Result<ConfirmDonationResult, DonationError> {
        let session = self
            .gateway
            .retrieve_session(&cmd.session_ref)
            .await
            .map_err(|e| DonationError::gateway_failure(e.to_string()))?
            .ok_or_else(|| DonationError::session_not_found(&cmd.session_ref))?;

        let outcome = self.confirm(&session).await?;

        Ok(ConfirmDonationResult { session, outcome })
    }

    /// Confirm a session whose state has already been established, either by
    /// gateway lookup or by a signature-verified webhook payload.
    ///
    /// Safe to invoke any number of times, concurrently or sequentially:
    /// exactly one invocation per paid session records the donation.
    pub async fn confirm(
        &self,
        session: &GatewaySession,
    ) -> Result<ConfirmOutcome, DonationError> {
        // 1. Only paid sessions reach the ledger
        if session.payment_status != PaymentStatus::Paid {
            return Ok(ConfirmOutcome::NotPaid);
        }

        // 2. Fast path: already recorded by an earlier confirmation
        if let Some(existing) = self.donations.find_by_session_ref(&session.id).await? {
            return Ok(ConfirmOutcome::AlreadyConfirmed(existing));
        }

        // 3. Parse the embedded intent; a paid session with bad metadata can
        //    never be recorded, so fail closed without writing
        let intent = SessionMetadata::decode(&session.metadata).map_err(|e| {
            tracing::warn!(
                session_ref = %session.id,
                error = %e,
                "Paid session has undecodable metadata"
            );
            DonationError::unconfirmable(&session.id, e.to_string())
        })?;

        // 4. Never store a user reference the directory cannot vouch for
        let user_id = match intent.user_id {
            Some(user_id) => {
                if self.users.exists(&user_id).await? {
                    Some(user_id)
                } else {
                    tracing::warn!(
                        session_ref = %session.id,
                        user_id = %user_id,
                        "Metadata references unknown user, recording as anonymous"
                    );
                    None
                }
            }
            None => None,
        };

        // 5.+6. Insert the donation and increment project funding atomically;
        //       the unique constraint on session_ref settles any race
        let donation = Donation::completed(
            intent.amount,
            intent.project_id,
            intent.donor_name,
            intent.donor_email,
            user_id,
            session.id.clone(),
        );

        match self.donations.record_completed(&donation).await? {
            RecordOutcome::Inserted => {
                tracing::info!(
                    session_ref = %session.id,
                    donation_id = %donation.id,
                    project_id = %donation.project_id,
                    amount = %donation.amount,
                    "Donation confirmed"
                );
                Ok(ConfirmOutcome::Confirmed(donation))
            }
            RecordOutcome::AlreadyRecorded => {
                // Lost the race; return the winner's row
                let existing = self
                    .donations
                    .find_by_session_ref(&session.id)
                    .await?
                    .ok_or_else(|| {
                        DonationError::infrastructure(format!(
                            "Donation for session {} vanished after conflict",
                            session.id
                        ))
                    })?;
                Ok(ConfirmOutcome::AlreadyConfirmed(existing))
            }
        }
    }
}
