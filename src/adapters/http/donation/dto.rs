//! Request and response DTOs for the donation endpoints.
//!
//! JSON field names are camelCase to match the web application's API
//! contract; `session_id` in the confirmation query string follows the
//! gateway redirect convention.

use serde::{Deserialize, Serialize};

use crate::application::handlers::donation::GoalProgress;
use crate::domain::donation::Donation;
use crate::domain::foundation::Timestamp;
use crate::ports::{DonationStatistics, GatewaySession};

/// Body of `POST /api/donations/checkout`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub amount: Option<f64>,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub donor_name: String,
    #[serde(default)]
    pub donor_email: String,
}

/// Response of `POST /api/donations/checkout`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
}

/// Query string of `GET /api/donations/confirm`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub session_id: String,
}

/// Query string of `GET /api/donations/recent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentQuery {
    pub project_id: Option<String>,
    pub limit: Option<u32>,
}

/// Query string of `GET /api/donations/stats`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub project_id: Option<String>,
}

/// A donation as exposed over the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationResponse {
    pub id: String,
    pub amount: f64,
    pub project_id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub user_id: Option<String>,
    pub session_ref: String,
    pub status: String,
    pub created_at: Timestamp,
}

impl From<Donation> for DonationResponse {
    fn from(donation: Donation) -> Self {
        Self {
            id: donation.id.to_string(),
            amount: donation.amount.value(),
            project_id: donation.project_id.to_string(),
            donor_name: donation.donor_name,
            donor_email: donation.donor_email,
            user_id: donation.user_id.map(|u| u.to_string()),
            session_ref: donation.session_ref,
            status: donation.status.as_str().to_string(),
            created_at: donation.created_at,
        }
    }
}

/// Gateway session state in the confirmation response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub payment_status: String,
}

impl From<&GatewaySession> for SessionResponse {
    fn from(session: &GatewaySession) -> Self {
        Self {
            id: session.id.clone(),
            payment_status: session.payment_status.as_str().to_string(),
        }
    }
}

/// Response of `GET /api/donations/confirm`.
///
/// `donation` is present once the session has been confirmed (by this call
/// or any earlier one); an unpaid session returns the session state alone.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation: Option<DonationResponse>,
    pub session: SessionResponse,
}

/// Response of `GET /api/donations/history` and `/recent`.
#[derive(Debug, Clone, Serialize)]
pub struct DonationListResponse {
    pub donations: Vec<DonationResponse>,
}

/// Statistics payload of `GET /api/donations/stats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_amount: f64,
    pub donation_count: u64,
    pub average_donation: f64,
    pub unique_donors: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_progress: Option<GoalProgress>,
}

impl StatsResponse {
    pub fn new(statistics: DonationStatistics, goal_progress: Option<GoalProgress>) -> Self {
        Self {
            total_amount: statistics.total_amount,
            donation_count: statistics.donation_count,
            average_donation: statistics.average_amount,
            unique_donors: statistics.unique_donors,
            goal_progress,
        }
    }
}

/// Wrapper for `GET /api/donations/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsEnvelope {
    pub stats: StatsResponse,
}

/// Webhook acknowledgment body.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Error body shared by all endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}
