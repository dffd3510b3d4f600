//! Query handlers for listing donations.

use std::sync::Arc;

use crate::domain::donation::{Donation, DonationError};
use crate::domain::foundation::{ProjectId, UserId};
use crate::ports::DonationRepository;

/// Recent-donation listings are capped regardless of the requested limit.
const MAX_RECENT_LIMIT: u32 = 50;

/// Default page size when the caller does not specify one.
const DEFAULT_RECENT_LIMIT: u32 = 10;

/// Query for the authenticated user's donation history.
#[derive(Debug, Clone)]
pub struct ListUserDonationsQuery {
    pub user_id: UserId,
}

/// Handler returning a user's donations, newest first.
pub struct ListUserDonationsHandler {
    donations: Arc<dyn DonationRepository>,
}

impl ListUserDonationsHandler {
    pub fn new(donations: Arc<dyn DonationRepository>) -> Self {
        Self { donations }
    }

    pub async fn handle(
        &self,
        query: ListUserDonationsQuery,
    ) -> Result<Vec<Donation>, DonationError> {
        Ok(self.donations.list_by_user(&query.user_id).await?)
    }
}

/// Query for recent completed donations, optionally scoped to a project.
#[derive(Debug, Clone)]
pub struct ListRecentDonationsQuery {
    pub project_id: Option<ProjectId>,
    pub limit: Option<u32>,
}

/// Handler returning recent completed donations, newest first.
pub struct ListRecentDonationsHandler {
    donations: Arc<dyn DonationRepository>,
}

impl ListRecentDonationsHandler {
    pub fn new(donations: Arc<dyn DonationRepository>) -> Self {
        Self { donations }
    }

    pub async fn handle(
        &self,
        query: ListRecentDonationsQuery,
    ) -> Result<Vec<Donation>, DonationError> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_RECENT_LIMIT)
            .min(MAX_RECENT_LIMIT);
        Ok(self
            .donations
            .list_recent(query.project_id.as_ref(), limit)
            .await?)
    }
}
