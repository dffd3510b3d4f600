//! User directory port.
//!
//! User accounts are owned by the auth subsystem. The donation core needs a
//! single contract from it: existence checks, so a user reference arriving in
//! external session metadata is never stored unverified.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Port for verifying user references.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether a user with this id exists.
    async fn exists(&self, user_id: &UserId) -> Result<bool, DomainError>;
}
