//! In-memory implementation of ProjectRepository.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProjectId};
use crate::domain::project::Project;
use crate::ports::ProjectRepository;

/// In-memory `ProjectRepository` implementation.
pub struct InMemoryProjectRepository {
    projects: Mutex<HashMap<ProjectId, Project>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self {
            projects: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a project into the store.
    pub fn insert(&self, project: Project) {
        self.projects.lock().unwrap().insert(project.id, project);
    }

    /// Apply a funding increment; returns false when the project is unknown.
    ///
    /// Called by the in-memory donation ledger under its own lock, keeping
    /// the insert + increment pair atomic with respect to other confirms.
    pub(crate) fn increment_funding(&self, id: &ProjectId, amount: f64) -> bool {
        let mut projects = self.projects.lock().unwrap();
        match projects.get_mut(id) {
            Some(project) => {
                project.current_funding += amount;
                true
            }
            None => false,
        }
    }
}

impl Default for InMemoryProjectRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        Ok(self.projects.lock().unwrap().get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use crate::domain::project::ProjectStatus;

    fn test_project() -> Project {
        Project {
            id: ProjectId::new(),
            title: "Medical Supply Drive".to_string(),
            description: "Supplies for health clinics.".to_string(),
            goal: 40_000.0,
            current_funding: 5_200.0,
            status: ProjectStatus::Active,
            start_date: Timestamp::from_unix_secs(1704067200),
            end_date: Timestamp::from_unix_secs(1735689600),
            created_at: Timestamp::from_unix_secs(1704067200),
        }
    }

    #[tokio::test]
    async fn find_by_id_returns_seeded_project() {
        let store = InMemoryProjectRepository::new();
        let project = test_project();
        store.insert(project.clone());

        let found = store.find_by_id(&project.id).await.unwrap();
        assert_eq!(found.unwrap().title, "Medical Supply Drive");

        let missing = store.find_by_id(&ProjectId::new()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn increment_funding_updates_total() {
        let store = InMemoryProjectRepository::new();
        let project = test_project();
        store.insert(project.clone());

        assert!(store.increment_funding(&project.id, 100.0));
        let found = store.find_by_id(&project.id).await.unwrap().unwrap();
        assert_eq!(found.current_funding, 5_300.0);
    }

    #[test]
    fn increment_funding_unknown_project_is_false() {
        let store = InMemoryProjectRepository::new();
        assert!(!store.increment_funding(&ProjectId::new(), 100.0));
    }
}
