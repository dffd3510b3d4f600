//! Project lookup port.
//!
//! The donation core only reads projects; project CRUD is owned by the
//! surrounding admin surface. Funding increments go through the donation
//! ledger's atomic `record_completed`, never through this port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProjectId};
use crate::domain::project::Project;

/// Port for reading projects.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Find a project by id.
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ProjectRepository) {}
    }
}
