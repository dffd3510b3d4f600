//! PostgreSQL implementation of UserDirectory.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::UserDirectory;

/// PostgreSQL implementation of the UserDirectory port.
///
/// Reads the auth subsystem's users table; this service never writes it.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a new directory over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn exists(&self, user_id: &UserId) -> Result<bool, DomainError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to check user existence: {}", e),
                    )
                })?;

        Ok(exists)
    }
}
