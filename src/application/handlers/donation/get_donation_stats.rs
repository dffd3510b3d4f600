//! GetDonationStatsHandler - Query handler for donation statistics.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::donation::DonationError;
use crate::domain::foundation::ProjectId;
use crate::ports::{DonationRepository, DonationStatistics, ProjectRepository};

/// Query for donation statistics, optionally scoped to a project.
#[derive(Debug, Clone)]
pub struct GetDonationStatsQuery {
    pub project_id: Option<ProjectId>,
}

/// Funding progress towards a project goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub current: f64,
    pub target: f64,
    pub percentage: f64,
}

/// Statistics plus goal progress when scoped to a known project.
#[derive(Debug, Clone)]
pub struct DonationStatsResult {
    pub statistics: DonationStatistics,
    pub goal_progress: Option<GoalProgress>,
}

/// Handler computing aggregate donation statistics.
pub struct GetDonationStatsHandler {
    donations: Arc<dyn DonationRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl GetDonationStatsHandler {
    pub fn new(
        donations: Arc<dyn DonationRepository>,
        projects: Arc<dyn ProjectRepository>,
    ) -> Self {
        Self { donations, projects }
    }

    pub async fn handle(
        &self,
        query: GetDonationStatsQuery,
    ) -> Result<DonationStatsResult, DonationError> {
        let statistics = self
            .donations
            .statistics(query.project_id.as_ref())
            .await?;

        // Goal progress comes from the project aggregate, when the scope
        // resolves to an existing project
        let goal_progress = match query.project_id {
            Some(project_id) => self
                .projects
                .find_by_id(&project_id)
                .await?
                .map(|project| GoalProgress {
                    current: project.current_funding,
                    target: project.goal,
                    percentage: project.funding_percentage(),
                }),
            None => None,
        };

        Ok(DonationStatsResult {
            statistics,
            goal_progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::donation::Donation;
    use crate::domain::foundation::{DomainError, Timestamp, UserId};
    use crate::domain::project::{Project, ProjectStatus};
    use crate::ports::RecordOutcome;
    use async_trait::async_trait;

    struct StatsLedger {
        stats: DonationStatistics,
    }

    #[async_trait]
    impl DonationRepository for StatsLedger {
        async fn record_completed(
            &self,
            _donation: &Donation,
        ) -> Result<RecordOutcome, DomainError> {
            Ok(RecordOutcome::Inserted)
        }

        async fn find_by_session_ref(
            &self,
            _session_ref: &str,
        ) -> Result<Option<Donation>, DomainError> {
            Ok(None)
        }

        async fn list_by_user(&self, _user_id: &UserId) -> Result<Vec<Donation>, DomainError> {
            Ok(vec![])
        }

        async fn list_recent(
            &self,
            _project_id: Option<&ProjectId>,
            _limit: u32,
        ) -> Result<Vec<Donation>, DomainError> {
            Ok(vec![])
        }

        async fn statistics(
            &self,
            _project_id: Option<&ProjectId>,
        ) -> Result<DonationStatistics, DomainError> {
            Ok(self.stats.clone())
        }
    }

    struct OneProject {
        project: Option<Project>,
    }

    #[async_trait]
    impl ProjectRepository for OneProject {
        async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
            Ok(self.project.clone().filter(|p| &p.id == id))
        }
    }

    fn test_project(goal: f64, current: f64) -> Project {
        Project {
            id: ProjectId::new(),
            title: "Education for All".to_string(),
            description: "Schools and resources.".to_string(),
            goal,
            current_funding: current,
            status: ProjectStatus::Active,
            start_date: Timestamp::from_unix_secs(1704067200),
            end_date: Timestamp::from_unix_secs(1735689600),
            created_at: Timestamp::from_unix_secs(1704067200),
        }
    }

    fn test_stats() -> DonationStatistics {
        DonationStatistics {
            total_amount: 300.0,
            donation_count: 4,
            average_amount: 75.0,
            unique_donors: 3,
        }
    }

    #[tokio::test]
    async fn global_stats_have_no_goal_progress() {
        let handler = GetDonationStatsHandler::new(
            Arc::new(StatsLedger { stats: test_stats() }),
            Arc::new(OneProject { project: None }),
        );

        let result = handler
            .handle(GetDonationStatsQuery { project_id: None })
            .await
            .unwrap();

        assert_eq!(result.statistics, test_stats());
        assert!(result.goal_progress.is_none());
    }

    #[tokio::test]
    async fn project_scope_includes_goal_progress() {
        let project = test_project(1000.0, 300.0);
        let project_id = project.id;
        let handler = GetDonationStatsHandler::new(
            Arc::new(StatsLedger { stats: test_stats() }),
            Arc::new(OneProject {
                project: Some(project),
            }),
        );

        let result = handler
            .handle(GetDonationStatsQuery {
                project_id: Some(project_id),
            })
            .await
            .unwrap();

        let progress = result.goal_progress.unwrap();
        assert_eq!(progress.current, 300.0);
        assert_eq!(progress.target, 1000.0);
        assert_eq!(progress.percentage, 30.0);
    }

    #[tokio::test]
    async fn unknown_project_scope_still_returns_stats() {
        let handler = GetDonationStatsHandler::new(
            Arc::new(StatsLedger { stats: test_stats() }),
            Arc::new(OneProject { project: None }),
        );

        let result = handler
            .handle(GetDonationStatsQuery {
                project_id: Some(ProjectId::new()),
            })
            .await
            .unwrap();

        assert_eq!(result.statistics.donation_count, 4);
        assert!(result.goal_progress.is_none());
    }
}
