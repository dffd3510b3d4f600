//! PostgreSQL implementation of ProjectRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId, Timestamp};
use crate::domain::project::{Project, ProjectStatus};
use crate::ports::ProjectRepository;

/// PostgreSQL implementation of the ProjectRepository port.
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a project.
#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    title: String,
    description: String,
    goal: f64,
    current_funding: f64,
    status: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = DomainError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: ProjectId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            goal: row.goal,
            current_funding: row.current_funding,
            status: parse_status(&row.status)?,
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: Timestamp::from_datetime(row.end_date),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_status(s: &str) -> Result<ProjectStatus, DomainError> {
    match s {
        "draft" => Ok(ProjectStatus::Draft),
        "active" => Ok(ProjectStatus::Active),
        "completed" => Ok(ProjectStatus::Completed),
        "archived" => Ok(ProjectStatus::Archived),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid project status: {}", s),
        )),
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
        let row: Option<ProjectRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, goal, current_funding, status,
                   start_date, end_date, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find project: {}", e),
            )
        })?;

        row.map(Project::try_from).transpose()
    }
}
