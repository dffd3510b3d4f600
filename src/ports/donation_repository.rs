//! Donation ledger port.
//!
//! The ledger is the only shared mutable state in the reconciliation flow.
//! Its race-safety contract lives here:
//!
//! - `record_completed` persists a donation AND applies the project funding
//!   increment as one atomic unit.
//! - A `session_ref` collision is not an error: the implementation must map
//!   the storage-level unique-constraint violation to
//!   [`RecordOutcome::AlreadyRecorded`], so a lost race reads as "someone
//!   else already confirmed this session".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::donation::Donation;
use crate::domain::foundation::{DomainError, ProjectId, UserId};

/// Result of attempting to record a completed donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// This call inserted the donation and incremented project funding.
    Inserted,
    /// A donation with this `session_ref` already exists; nothing was written.
    AlreadyRecorded,
}

/// Aggregate statistics over completed donations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationStatistics {
    /// Sum of completed donation amounts.
    pub total_amount: f64,

    /// Number of completed donations.
    pub donation_count: u64,

    /// Mean completed donation amount (0 when there are none).
    pub average_amount: f64,

    /// Distinct donors, combining verified user ids with raw donor emails
    /// for anonymous donations.
    pub unique_donors: u64,
}

/// Port for the donation ledger.
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Insert a completed donation and increment the target project's
    /// funding total, atomically.
    ///
    /// The `session_ref` unique constraint is the race guard: when two
    /// confirmations race, exactly one caller observes
    /// [`RecordOutcome::Inserted`].
    async fn record_completed(&self, donation: &Donation) -> Result<RecordOutcome, DomainError>;

    /// Find a donation by its gateway session reference.
    async fn find_by_session_ref(
        &self,
        session_ref: &str,
    ) -> Result<Option<Donation>, DomainError>;

    /// List donations owned by a user, newest first.
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Donation>, DomainError>;

    /// List recent completed donations, optionally scoped to a project,
    /// newest first.
    async fn list_recent(
        &self,
        project_id: Option<&ProjectId>,
        limit: u32,
    ) -> Result<Vec<Donation>, DomainError>;

    /// Aggregate statistics over completed donations, optionally scoped to a
    /// project.
    async fn statistics(
        &self,
        project_id: Option<&ProjectId>,
    ) -> Result<DonationStatistics, DomainError>;
}
