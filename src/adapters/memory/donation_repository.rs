//! In-memory implementation of the donation ledger.
//!
//! Mirrors the storage contract of the Postgres adapter: the first insert
//! per `session_ref` wins and increments project funding; later inserts
//! observe `AlreadyRecorded`. A single mutex makes the insert + increment
//! pair atomic, the way the SQL transaction does in production.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::donation::{Donation, DonationStatus};
use crate::domain::foundation::{DomainError, ErrorCode, ProjectId, UserId};
use crate::ports::{DonationRepository, DonationStatistics, RecordOutcome};

use super::InMemoryProjectRepository;

/// In-memory `DonationRepository` implementation.
pub struct InMemoryDonationRepository {
    rows: Mutex<HashMap<String, Donation>>,
    projects: Arc<InMemoryProjectRepository>,
}

impl InMemoryDonationRepository {
    /// Creates a ledger whose funding increments apply to the given project
    /// store.
    pub fn new(projects: Arc<InMemoryProjectRepository>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            projects,
        }
    }

    /// Number of donations in the ledger.
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl DonationRepository for InMemoryDonationRepository {
    async fn record_completed(&self, donation: &Donation) -> Result<RecordOutcome, DomainError> {
        // One lock scope covers uniqueness check, insert, and funding
        // increment; this is the in-memory stand-in for the SQL transaction
        let mut rows = self.rows.lock().unwrap();

        if rows.contains_key(&donation.session_ref) {
            return Ok(RecordOutcome::AlreadyRecorded);
        }

        if !self
            .projects
            .increment_funding(&donation.project_id, donation.amount.value())
        {
            return Err(DomainError::new(
                ErrorCode::ProjectNotFound,
                format!(
                    "Project {} not found for funding update",
                    donation.project_id
                ),
            ));
        }

        rows.insert(donation.session_ref.clone(), donation.clone());
        Ok(RecordOutcome::Inserted)
    }

    async fn find_by_session_ref(
        &self,
        session_ref: &str,
    ) -> Result<Option<Donation>, DomainError> {
        Ok(self.rows.lock().unwrap().get(session_ref).cloned())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Donation>, DomainError> {
        let rows = self.rows.lock().unwrap();
        let mut donations: Vec<Donation> = rows
            .values()
            .filter(|d| d.user_id.as_ref() == Some(user_id))
            .cloned()
            .collect();
        donations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(donations)
    }

    async fn list_recent(
        &self,
        project_id: Option<&ProjectId>,
        limit: u32,
    ) -> Result<Vec<Donation>, DomainError> {
        let rows = self.rows.lock().unwrap();
        let mut donations: Vec<Donation> = rows
            .values()
            .filter(|d| d.status == DonationStatus::Completed)
            .filter(|d| project_id.map_or(true, |p| &d.project_id == p))
            .cloned()
            .collect();
        donations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        donations.truncate(limit as usize);
        Ok(donations)
    }

    async fn statistics(
        &self,
        project_id: Option<&ProjectId>,
    ) -> Result<DonationStatistics, DomainError> {
        let rows = self.rows.lock().unwrap();
        let completed: Vec<&Donation> = rows
            .values()
            .filter(|d| d.status == DonationStatus::Completed)
            .filter(|d| project_id.map_or(true, |p| &d.project_id == p))
            .collect();

        let donation_count = completed.len() as u64;
        let total_amount: f64 = completed.iter().map(|d| d.amount.value()).sum();
        let average_amount = if donation_count > 0 {
            total_amount / donation_count as f64
        } else {
            0.0
        };

        let unique_donors = completed
            .iter()
            .map(|d| {
                d.user_id
                    .as_ref()
                    .map(|u| u.as_str().to_string())
                    .unwrap_or_else(|| d.donor_email.clone())
            })
            .collect::<std::collections::HashSet<_>>()
            .len() as u64;

        Ok(DonationStatistics {
            total_amount,
            donation_count,
            average_amount,
            unique_donors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DonationAmount, Timestamp};
    use crate::domain::project::{Project, ProjectStatus};
    use crate::ports::ProjectRepository;

    fn project_store_with(project: Project) -> Arc<InMemoryProjectRepository> {
        let store = Arc::new(InMemoryProjectRepository::new());
        store.insert(project);
        store
    }

    fn test_project() -> Project {
        Project {
            id: ProjectId::new(),
            title: "Emergency Food Relief".to_string(),
            description: "Food packages for families.".to_string(),
            goal: 25_000.0,
            current_funding: 0.0,
            status: ProjectStatus::Active,
            start_date: Timestamp::from_unix_secs(1704067200),
            end_date: Timestamp::from_unix_secs(1735689600),
            created_at: Timestamp::from_unix_secs(1704067200),
        }
    }

    fn donation(project_id: ProjectId, session_ref: &str, amount: f64) -> Donation {
        Donation::completed(
            DonationAmount::new(amount).unwrap(),
            project_id,
            "Jane Doe",
            "jane@example.com",
            None,
            session_ref,
        )
    }

    #[tokio::test]
    async fn first_record_inserts_and_increments() {
        let project = test_project();
        let projects = project_store_with(project.clone());
        let ledger = InMemoryDonationRepository::new(projects.clone());

        let outcome = ledger
            .record_completed(&donation(project.id, "cs_1", 25.0))
            .await
            .unwrap();

        assert_eq!(outcome, RecordOutcome::Inserted);
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            projects.find_by_id(&project.id).await.unwrap().unwrap().current_funding,
            25.0
        );
    }

    #[tokio::test]
    async fn duplicate_session_ref_does_not_double_count() {
        let project = test_project();
        let projects = project_store_with(project.clone());
        let ledger = InMemoryDonationRepository::new(projects.clone());

        ledger
            .record_completed(&donation(project.id, "cs_1", 25.0))
            .await
            .unwrap();
        let outcome = ledger
            .record_completed(&donation(project.id, "cs_1", 25.0))
            .await
            .unwrap();

        assert_eq!(outcome, RecordOutcome::AlreadyRecorded);
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            projects.find_by_id(&project.id).await.unwrap().unwrap().current_funding,
            25.0
        );
    }

    #[tokio::test]
    async fn unknown_project_fails_without_inserting() {
        let projects = Arc::new(InMemoryProjectRepository::new());
        let ledger = InMemoryDonationRepository::new(projects);

        let result = ledger
            .record_completed(&donation(ProjectId::new(), "cs_1", 25.0))
            .await;

        assert!(result.is_err());
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn statistics_aggregate_completed_donations() {
        let project = test_project();
        let projects = project_store_with(project.clone());
        let ledger = InMemoryDonationRepository::new(projects);

        ledger
            .record_completed(&donation(project.id, "cs_1", 10.0))
            .await
            .unwrap();
        ledger
            .record_completed(&donation(project.id, "cs_2", 30.0))
            .await
            .unwrap();

        let stats = ledger.statistics(Some(&project.id)).await.unwrap();
        assert_eq!(stats.total_amount, 40.0);
        assert_eq!(stats.donation_count, 2);
        assert_eq!(stats.average_amount, 20.0);
        // Same donor email on both rows
        assert_eq!(stats.unique_donors, 1);
    }

    #[tokio::test]
    async fn list_recent_scopes_and_limits() {
        let project_a = test_project();
        let project_b = test_project();
        let projects = Arc::new(InMemoryProjectRepository::new());
        projects.insert(project_a.clone());
        projects.insert(project_b.clone());
        let ledger = InMemoryDonationRepository::new(projects);

        for (i, p) in [&project_a, &project_a, &project_b].iter().enumerate() {
            ledger
                .record_completed(&donation(p.id, &format!("cs_{}", i), 10.0))
                .await
                .unwrap();
        }

        let scoped = ledger.list_recent(Some(&project_a.id), 10).await.unwrap();
        assert_eq!(scoped.len(), 2);

        let limited = ledger.list_recent(None, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }
}
