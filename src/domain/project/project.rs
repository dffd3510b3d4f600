//! Project aggregate entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ProjectId, Timestamp};

/// Lifecycle status of a fundraising project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Not yet published; does not accept donations.
    Draft,
    /// Published and accepting donations.
    Active,
    /// Funding goal reached or campaign finished.
    Completed,
    /// Removed from listings; kept for history.
    Archived,
}

impl ProjectStatus {
    /// Whether donations may target a project in this status.
    pub fn accepts_donations(&self) -> bool {
        matches!(self, ProjectStatus::Active)
    }
}

/// Project aggregate - a fundraising campaign.
///
/// # Invariants
///
/// - `current_funding` equals the sum of completed donation amounts for this
///   project. It is maintained by increment only; the sole writer is the
///   donation reconciliation path, inside the same transaction as the
///   donation insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier for this project.
    pub id: ProjectId,

    /// Short human-readable title.
    pub title: String,

    /// Longer description shown on the project page.
    pub description: String,

    /// Funding target, in whole currency units.
    pub goal: f64,

    /// Running total of completed donations.
    pub current_funding: f64,

    /// Current lifecycle status.
    pub status: ProjectStatus,

    /// Campaign start date.
    pub start_date: Timestamp,

    /// Campaign end date.
    pub end_date: Timestamp,

    /// When the project was created.
    pub created_at: Timestamp,
}

impl Project {
    /// Fraction of the goal reached so far, as a percentage.
    ///
    /// Returns 0 for a zero goal rather than dividing by it.
    pub fn funding_percentage(&self) -> f64 {
        if self.goal <= 0.0 {
            return 0.0;
        }
        (self.current_funding / self.goal) * 100.0
    }

    /// Whether the funding goal has been reached.
    pub fn is_fully_funded(&self) -> bool {
        self.current_funding >= self.goal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_project(goal: f64, current: f64) -> Project {
        Project {
            id: ProjectId::new(),
            title: "Clean Water Initiative".to_string(),
            description: "Providing clean drinking water to rural communities.".to_string(),
            goal,
            current_funding: current,
            status: ProjectStatus::Active,
            start_date: Timestamp::from_unix_secs(1704067200),
            end_date: Timestamp::from_unix_secs(1735689600),
            created_at: Timestamp::from_unix_secs(1704067200),
        }
    }

    #[test]
    fn funding_percentage_computes_progress() {
        let project = test_project(50_000.0, 12_500.0);
        assert_eq!(project.funding_percentage(), 25.0);
    }

    #[test]
    fn funding_percentage_handles_zero_goal() {
        let project = test_project(0.0, 100.0);
        assert_eq!(project.funding_percentage(), 0.0);
    }

    #[test]
    fn fully_funded_at_or_above_goal() {
        assert!(test_project(1000.0, 1000.0).is_fully_funded());
        assert!(test_project(1000.0, 1500.0).is_fully_funded());
        assert!(!test_project(1000.0, 999.0).is_fully_funded());
    }

    #[test]
    fn only_active_projects_accept_donations() {
        assert!(ProjectStatus::Active.accepts_donations());
        assert!(!ProjectStatus::Draft.accepts_donations());
        assert!(!ProjectStatus::Completed.accepts_donations());
        assert!(!ProjectStatus::Archived.accepts_donations());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::Active).unwrap(),
            "\"active\""
        );
    }
}
