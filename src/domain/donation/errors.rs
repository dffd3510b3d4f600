//! Donation-specific error types.
//!
//! Errors related to checkout initiation, payment reconciliation, and ledger
//! queries.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ProjectNotFound | 404 |
//! | SessionNotFound | 404 |
//! | ValidationFailed | 400 |
//! | InvalidWebhookSignature | 401 |
//! | UnconfirmableSession | 500 |
//! | GatewayFailure | 502 |
//! | Infrastructure | 500 |
//!
//! Note: a duplicate `session_ref` is deliberately NOT an error. The storage
//! conflict is caught inside the reconciliation path and resolved to the
//! existing donation, so callers only ever see idempotent success.

use crate::domain::foundation::{DomainError, ErrorCode, ProjectId};

/// Donation-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationError {
    /// Target project does not exist.
    ProjectNotFound(ProjectId),

    /// Checkout session reference is unknown to the gateway.
    SessionNotFound(String),

    /// Request validation failed.
    ValidationFailed { field: String, message: String },

    /// Webhook signature verification failed.
    InvalidWebhookSignature,

    /// Session is paid but its metadata cannot be decoded; the donation can
    /// never be recorded from this session. Fail closed, write nothing.
    UnconfirmableSession { session_ref: String, reason: String },

    /// Payment gateway call failed or timed out.
    GatewayFailure { reason: String },

    /// Infrastructure error (database, serialization).
    Infrastructure(String),
}

impl DonationError {
    pub fn project_not_found(id: ProjectId) -> Self {
        DonationError::ProjectNotFound(id)
    }

    pub fn session_not_found(session_ref: impl Into<String>) -> Self {
        DonationError::SessionNotFound(session_ref.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DonationError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_webhook_signature() -> Self {
        DonationError::InvalidWebhookSignature
    }

    pub fn unconfirmable(session_ref: impl Into<String>, reason: impl Into<String>) -> Self {
        DonationError::UnconfirmableSession {
            session_ref: session_ref.into(),
            reason: reason.into(),
        }
    }

    pub fn gateway_failure(reason: impl Into<String>) -> Self {
        DonationError::GatewayFailure {
            reason: reason.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        DonationError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DonationError::ProjectNotFound(_) => ErrorCode::ProjectNotFound,
            DonationError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            DonationError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            DonationError::InvalidWebhookSignature => ErrorCode::InvalidWebhookSignature,
            DonationError::UnconfirmableSession { .. } => ErrorCode::InternalError,
            DonationError::GatewayFailure { .. } => ErrorCode::PaymentGatewayError,
            DonationError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            DonationError::ProjectNotFound(id) => format!("Project not found: {}", id),
            DonationError::SessionNotFound(session_ref) => {
                format!("Checkout session not found: {}", session_ref)
            }
            DonationError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            DonationError::InvalidWebhookSignature => "Invalid webhook signature".to_string(),
            DonationError::UnconfirmableSession {
                session_ref,
                reason,
            } => format!("Session {} cannot be confirmed: {}", session_ref, reason),
            DonationError::GatewayFailure { reason } => {
                format!("Payment gateway error: {}", reason)
            }
            DonationError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Whether a retry of the same request could succeed.
    ///
    /// Drives the webhook response: retryable failures return an error status
    /// so the gateway redelivers; the idempotency guard makes redelivery safe.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DonationError::GatewayFailure { .. } | DonationError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for DonationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for DonationError {}

impl From<DomainError> for DonationError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ProjectNotFound => {
                DonationError::Infrastructure(err.to_string())
            }
            ErrorCode::ValidationFailed => DonationError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::PaymentGatewayError => DonationError::GatewayFailure {
                reason: err.message,
            },
            _ => DonationError::Infrastructure(err.to_string()),
        }
    }
}

impl From<DonationError> for DomainError {
    fn from(err: DonationError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
