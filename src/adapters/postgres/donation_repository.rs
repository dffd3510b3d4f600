//! PostgreSQL implementation of the donation ledger.
//!
//! `record_completed` is the concurrency-critical operation: the donation
//! insert and the project funding increment run in one transaction, and the
//! unique constraint on `donations.session_ref` settles races between the
//! polling and webhook confirmation paths. A constraint violation rolls the
//! transaction back and reports `RecordOutcome::AlreadyRecorded`, never an
//! error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::donation::{Donation, DonationStatus};
use crate::domain::foundation::{
    DomainError, DonationAmount, DonationId, ErrorCode, ProjectId, Timestamp, UserId,
};
use crate::ports::{DonationRepository, DonationStatistics, RecordOutcome};

/// Name of the unique constraint guarding the idempotency key.
const SESSION_REF_CONSTRAINT: &str = "donations_session_ref_key";

/// PostgreSQL implementation of the DonationRepository port.
pub struct PostgresDonationRepository {
    pool: PgPool,
}

impl PostgresDonationRepository {
    /// Creates a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a donation.
#[derive(Debug, sqlx::FromRow)]
struct DonationRow {
    id: Uuid,
    amount: f64,
    project_id: Uuid,
    donor_name: String,
    donor_email: String,
    user_id: Option<String>,
    session_ref: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<DonationRow> for Donation {
    type Error = DomainError;

    fn try_from(row: DonationRow) -> Result<Self, Self::Error> {
        let amount = DonationAmount::new(row.amount).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid amount: {}", e))
        })?;
        let user_id = row
            .user_id
            .map(UserId::new)
            .transpose()
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?;

        Ok(Donation {
            id: DonationId::from_uuid(row.id),
            amount,
            project_id: ProjectId::from_uuid(row.project_id),
            donor_name: row.donor_name,
            donor_email: row.donor_email,
            user_id,
            session_ref: row.session_ref,
            status: parse_status(&row.status)?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_status(s: &str) -> Result<DonationStatus, DomainError> {
    match s {
        "pending" => Ok(DonationStatus::Pending),
        "completed" => Ok(DonationStatus::Completed),
        "failed" => Ok(DonationStatus::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid donation status: {}", s),
        )),
    }
}

fn status_to_string(status: &DonationStatus) -> &'static str {
    match status {
        DonationStatus::Pending => "pending",
        DonationStatus::Completed => "completed",
        DonationStatus::Failed => "failed",
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

const SELECT_DONATION: &str = r#"
    SELECT id, amount, project_id, donor_name, donor_email, user_id,
           session_ref, status, created_at
    FROM donations
"#;

#[async_trait]
impl DonationRepository for PostgresDonationRepository {
    async fn record_completed(&self, donation: &Donation) -> Result<RecordOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let insert = sqlx::query(
            r#"
            INSERT INTO donations (
                id, amount, project_id, donor_name, donor_email, user_id,
                session_ref, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(donation.id.as_uuid())
        .bind(donation.amount.value())
        .bind(donation.project_id.as_uuid())
        .bind(&donation.donor_name)
        .bind(&donation.donor_email)
        .bind(donation.user_id.as_ref().map(|u| u.as_str()))
        .bind(&donation.session_ref)
        .bind(status_to_string(&donation.status))
        .bind(donation.created_at.as_datetime())
        .execute(&mut *tx)
        .await;

        if let Err(e) = insert {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(SESSION_REF_CONSTRAINT) {
                    // Another confirmation won the race; nothing was written
                    return Ok(RecordOutcome::AlreadyRecorded);
                }
            }
            return Err(db_error("Failed to insert donation", e));
        }

        // Funding increment rides in the same transaction as the insert
        let updated = sqlx::query(
            "UPDATE projects SET current_funding = current_funding + $2 WHERE id = $1",
        )
        .bind(donation.project_id.as_uuid())
        .bind(donation.amount.value())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to increment project funding", e))?;

        if updated.rows_affected() == 0 {
            // Dropping tx rolls the insert back
            return Err(DomainError::new(
                ErrorCode::ProjectNotFound,
                format!("Project {} not found for funding update", donation.project_id),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit donation", e))?;

        Ok(RecordOutcome::Inserted)
    }

    async fn find_by_session_ref(
        &self,
        session_ref: &str,
    ) -> Result<Option<Donation>, DomainError> {
        let row: Option<DonationRow> =
            sqlx::query_as(&format!("{} WHERE session_ref = $1", SELECT_DONATION))
                .bind(session_ref)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to find donation", e))?;

        row.map(Donation::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Donation>, DomainError> {
        let rows: Vec<DonationRow> = sqlx::query_as(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_DONATION
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list donations", e))?;

        rows.into_iter().map(Donation::try_from).collect()
    }

    async fn list_recent(
        &self,
        project_id: Option<&ProjectId>,
        limit: u32,
    ) -> Result<Vec<Donation>, DomainError> {
        let rows: Vec<DonationRow> = sqlx::query_as(&format!(
            r#"{} WHERE status = 'completed'
                 AND ($1::uuid IS NULL OR project_id = $1)
               ORDER BY created_at DESC
               LIMIT $2"#,
            SELECT_DONATION
        ))
        .bind(project_id.map(|p| *p.as_uuid()))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list recent donations", e))?;

        rows.into_iter().map(Donation::try_from).collect()
    }

    async fn statistics(
        &self,
        project_id: Option<&ProjectId>,
    ) -> Result<DonationStatistics, DomainError> {
        // Distinct donors combine verified user ids with donor emails for
        // anonymous donations. Parameterized; the scope never enters the SQL
        // text.
        let row: (Option<f64>, i64, Option<f64>, i64) = sqlx::query_as(
            r#"
            SELECT SUM(amount),
                   COUNT(*),
                   AVG(amount),
                   COUNT(DISTINCT COALESCE(user_id, donor_email))
            FROM donations
            WHERE status = 'completed'
              AND ($1::uuid IS NULL OR project_id = $1)
            "#,
        )
        .bind(project_id.map(|p| *p.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to compute donation statistics", e))?;

        Ok(DonationStatistics {
            total_amount: row.0.unwrap_or(0.0),
            donation_count: row.1 as u64,
            average_amount: row.2.unwrap_or(0.0),
            unique_donors: row.3 as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_accepts_known_values() {
        assert_eq!(parse_status("pending").unwrap(), DonationStatus::Pending);
        assert_eq!(parse_status("completed").unwrap(), DonationStatus::Completed);
        assert_eq!(parse_status("failed").unwrap(), DonationStatus::Failed);
    }

    #[test]
    fn parse_status_rejects_unknown_values() {
        assert!(parse_status("refunded").is_err());
        assert!(parse_status("").is_err());
    }

    #[test]
    fn status_roundtrips_through_strings() {
        for status in [
            DonationStatus::Pending,
            DonationStatus::Completed,
            DonationStatus::Failed,
        ] {
            assert_eq!(parse_status(status_to_string(&status)).unwrap(), status);
        }
    }

    #[test]
    fn donation_row_converts_to_domain() {
        let row = DonationRow {
            id: Uuid::new_v4(),
            amount: 25.0,
            project_id: Uuid::new_v4(),
            donor_name: "Jane Doe".to_string(),
            donor_email: "jane@example.com".to_string(),
            user_id: None,
            session_ref: "cs_row_1".to_string(),
            status: "completed".to_string(),
            created_at: Utc::now(),
        };

        let donation = Donation::try_from(row).unwrap();
        assert_eq!(donation.amount.value(), 25.0);
        assert!(donation.is_anonymous());
        assert_eq!(donation.status, DonationStatus::Completed);
    }

    #[test]
    fn donation_row_rejects_invalid_amount() {
        let row = DonationRow {
            id: Uuid::new_v4(),
            amount: 0.0,
            project_id: Uuid::new_v4(),
            donor_name: "Jane Doe".to_string(),
            donor_email: "jane@example.com".to_string(),
            user_id: None,
            session_ref: "cs_row_2".to_string(),
            status: "completed".to_string(),
            created_at: Utc::now(),
        };

        assert!(Donation::try_from(row).is_err());
    }
}
