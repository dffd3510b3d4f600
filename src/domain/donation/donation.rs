//! Donation aggregate entity.
//!
//! A Donation is the persisted record of a payment made towards a project.
//! It is created exactly once, at confirmation time, keyed by the payment
//! gateway's session reference.
//!
//! # Design Decisions
//!
//! - **Created at confirmation, not initiation**: starting a checkout writes
//!   nothing; the row appears only once the gateway reports the session paid.
//! - **`session_ref` is the idempotency key**: at most one row exists per
//!   gateway session, enforced by a storage-level unique constraint.
//! - **Append-only**: rows are never updated or deleted by normal operation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DonationAmount, DonationId, ProjectId, Timestamp, UserId};

/// Status of a donation ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    /// Awaiting payment confirmation.
    Pending,
    /// Payment confirmed by the gateway.
    Completed,
    /// Payment failed or session expired.
    Failed,
}

impl DonationStatus {
    /// Whether this donation counts towards project funding.
    pub fn counts_towards_funding(&self) -> bool {
        matches!(self, DonationStatus::Completed)
    }

    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Completed => "completed",
            DonationStatus::Failed => "failed",
        }
    }
}

/// Donation aggregate - one confirmed (or pending) payment towards a project.
///
/// # Invariants
///
/// - `session_ref` is unique across all donations
/// - `amount` is at least the minimum donation
/// - `user_id` is either `None` (anonymous donor) or a verified user reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    /// Unique identifier for this donation.
    pub id: DonationId,

    /// Donated amount.
    pub amount: DonationAmount,

    /// Project this donation funds.
    pub project_id: ProjectId,

    /// Donor display name as entered on the donation form.
    pub donor_name: String,

    /// Donor contact email as entered on the donation form.
    pub donor_email: String,

    /// Owning user, when the donor was authenticated and the reference
    /// verified against the user directory. `None` for anonymous donations.
    pub user_id: Option<UserId>,

    /// Payment gateway session reference. The idempotency key.
    pub session_ref: String,

    /// Current status.
    pub status: DonationStatus,

    /// When the donation was recorded.
    pub created_at: Timestamp,
}

impl Donation {
    /// Creates a completed donation from a confirmed checkout session.
    pub fn completed(
        amount: DonationAmount,
        project_id: ProjectId,
        donor_name: impl Into<String>,
        donor_email: impl Into<String>,
        user_id: Option<UserId>,
        session_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: DonationId::new(),
            amount,
            project_id,
            donor_name: donor_name.into(),
            donor_email: donor_email.into(),
            user_id,
            session_ref: session_ref.into(),
            status: DonationStatus::Completed,
            created_at: Timestamp::now(),
        }
    }

    /// Whether this donation was made without an authenticated user.
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_donation(user_id: Option<UserId>) -> Donation {
        Donation::completed(
            DonationAmount::new(25.0).unwrap(),
            ProjectId::new(),
            "Jane Doe",
            "jane@example.com",
            user_id,
            "cs_test_abc123",
        )
    }

    #[test]
    fn completed_donation_has_completed_status() {
        let donation = test_donation(None);
        assert_eq!(donation.status, DonationStatus::Completed);
        assert_eq!(donation.session_ref, "cs_test_abc123");
    }

    #[test]
    fn anonymous_when_no_user_reference() {
        assert!(test_donation(None).is_anonymous());
        assert!(!test_donation(Some(UserId::new("usr_1").unwrap())).is_anonymous());
    }

    #[test]
    fn only_completed_counts_towards_funding() {
        assert!(DonationStatus::Completed.counts_towards_funding());
        assert!(!DonationStatus::Pending.counts_towards_funding());
        assert!(!DonationStatus::Failed.counts_towards_funding());
    }

    #[test]
    fn each_donation_gets_a_fresh_id() {
        assert_ne!(test_donation(None).id, test_donation(None).id);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DonationStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
