//! HTTP handlers for the donation endpoints.
//!
//! These handlers connect axum routes to the application layer command and
//! query handlers.

use std::sync::Arc;

use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::donation::{
    ConfirmDonationCommand, ConfirmDonationHandler, GetDonationStatsHandler,
    GetDonationStatsQuery, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    InitiateCheckoutCommand, InitiateCheckoutHandler, ListRecentDonationsHandler,
    ListRecentDonationsQuery, ListUserDonationsHandler, ListUserDonationsQuery,
};
use crate::domain::donation::DonationError;
use crate::domain::foundation::{ProjectId, UserId};
use crate::ports::{DonationRepository, PaymentGateway, ProjectRepository, UserDirectory};

use super::dto::{
    CheckoutResponse, ConfirmQuery, ConfirmResponse, CreateCheckoutRequest, DonationListResponse,
    DonationResponse, ErrorResponse, RecentQuery, SessionResponse, StatsEnvelope, StatsQuery,
    StatsResponse, WebhookAck,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct DonationAppState {
    pub donations: Arc<dyn DonationRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub gateway: Arc<dyn PaymentGateway>,
    /// Public base URL of the web application, for redirect targets.
    pub public_base_url: String,
}

impl DonationAppState {
    /// Create handlers on demand from the shared state.
    pub fn initiate_checkout_handler(&self) -> InitiateCheckoutHandler {
        InitiateCheckoutHandler::new(
            self.gateway.clone(),
            self.projects.clone(),
            self.public_base_url.clone(),
        )
    }

    pub fn confirm_donation_handler(&self) -> ConfirmDonationHandler {
        ConfirmDonationHandler::new(
            self.gateway.clone(),
            self.donations.clone(),
            self.users.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.gateway.clone(),
            self.donations.clone(),
            self.users.clone(),
        )
    }

    pub fn user_donations_handler(&self) -> ListUserDonationsHandler {
        ListUserDonationsHandler::new(self.donations.clone())
    }

    pub fn recent_donations_handler(&self) -> ListRecentDonationsHandler {
        ListRecentDonationsHandler::new(self.donations.clone())
    }

    pub fn stats_handler(&self) -> GetDonationStatsHandler {
        GetDonationStatsHandler::new(self.donations.clone(), self.projects.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (supplied by the surrounding auth collaborator)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from the request.
///
/// Session issuance and validation are owned by the auth collaborator in
/// front of this service; it forwards the verified identity in the
/// `X-User-Id` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| UserId::new(s).ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/donations/checkout - Start a hosted checkout for a donation
pub async fn create_checkout(
    State(state): State<DonationAppState>,
    user: Option<AuthenticatedUser>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, DonationApiError> {
    let amount = request
        .amount
        .ok_or_else(|| DonationError::validation("amount", "Missing required field"))?;
    let project_id = parse_project_id(&request.project_id)?;

    let handler = state.initiate_checkout_handler();
    let cmd = InitiateCheckoutCommand {
        amount,
        project_id,
        donor_name: request.donor_name,
        donor_email: request.donor_email,
        user_id: user.map(|u| u.user_id),
    };

    let result = handler.handle(cmd).await?;

    let response = CheckoutResponse {
        session_id: result.session_ref,
        checkout_url: result.checkout_url,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/donations/confirm?session_id=... - Polling confirmation
pub async fn poll_confirmation(
    State(state): State<DonationAppState>,
    Query(query): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, DonationApiError> {
    if query.session_id.trim().is_empty() {
        return Err(DonationError::validation("session_id", "Missing required parameter").into());
    }

    let handler = state.confirm_donation_handler();
    let result = handler
        .handle(ConfirmDonationCommand {
            session_ref: query.session_id,
        })
        .await?;

    let response = ConfirmResponse {
        donation: result
            .outcome
            .donation()
            .cloned()
            .map(DonationResponse::from),
        session: SessionResponse::from(&result.session),
    };

    Ok(Json(response))
}

/// POST /api/webhooks/stripe - Gateway push confirmation
pub async fn handle_stripe_webhook(
    State(state): State<DonationAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, DonationApiError> {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(DonationError::InvalidWebhookSignature)?;

    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    handler.handle(cmd).await?;

    Ok(Json(WebhookAck { received: true }))
}

/// GET /api/donations/history - Authenticated user's donation history
pub async fn donation_history(
    State(state): State<DonationAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, DonationApiError> {
    let handler = state.user_donations_handler();
    let donations = handler
        .handle(ListUserDonationsQuery {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(DonationListResponse {
        donations: donations.into_iter().map(DonationResponse::from).collect(),
    }))
}

/// GET /api/donations/recent - Recent completed donations
pub async fn recent_donations(
    State(state): State<DonationAppState>,
    Query(query): Query<RecentQuery>,
) -> Result<impl IntoResponse, DonationApiError> {
    let project_id = parse_optional_project_id(query.project_id.as_deref())?;

    let handler = state.recent_donations_handler();
    let donations = handler
        .handle(ListRecentDonationsQuery {
            project_id,
            limit: query.limit,
        })
        .await?;

    Ok(Json(DonationListResponse {
        donations: donations.into_iter().map(DonationResponse::from).collect(),
    }))
}

/// GET /api/donations/stats - Aggregate donation statistics
pub async fn donation_stats(
    State(state): State<DonationAppState>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, DonationApiError> {
    let project_id = parse_optional_project_id(query.project_id.as_deref())?;

    let handler = state.stats_handler();
    let result = handler.handle(GetDonationStatsQuery { project_id }).await?;

    Ok(Json(StatsEnvelope {
        stats: StatsResponse::new(result.statistics, result.goal_progress),
    }))
}

fn parse_project_id(raw: &str) -> Result<ProjectId, DonationError> {
    if raw.trim().is_empty() {
        return Err(DonationError::validation("projectId", "Missing required field"));
    }
    raw.parse()
        .map_err(|_| DonationError::validation("projectId", "Not a valid project id"))
}

fn parse_optional_project_id(raw: Option<&str>) -> Result<Option<ProjectId>, DonationError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| DonationError::validation("projectId", "Not a valid project id")),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
pub struct DonationApiError(DonationError);

impl From<DonationError> for DonationApiError {
    fn from(err: DonationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for DonationApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            DonationError::ProjectNotFound(_) | DonationError::SessionNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            DonationError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            DonationError::InvalidWebhookSignature => StatusCode::UNAUTHORIZED,
            DonationError::UnconfirmableSession { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            DonationError::GatewayFailure { .. } => StatusCode::BAD_GATEWAY,
            DonationError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryDonationRepository, InMemoryProjectRepository, InMemoryUserDirectory,
    };
    use crate::adapters::stripe::MockPaymentGateway;
    use crate::domain::foundation::Timestamp;
    use crate::domain::project::{Project, ProjectStatus};

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn test_project() -> Project {
        Project {
            id: ProjectId::new(),
            title: "Clean Water Initiative".to_string(),
            description: "Water for rural communities.".to_string(),
            goal: 50_000.0,
            current_funding: 0.0,
            status: ProjectStatus::Active,
            start_date: Timestamp::from_unix_secs(1704067200),
            end_date: Timestamp::from_unix_secs(1735689600),
            created_at: Timestamp::from_unix_secs(1704067200),
        }
    }

    fn test_state() -> (DonationAppState, Project, Arc<MockPaymentGateway>) {
        let project = test_project();
        let projects = Arc::new(InMemoryProjectRepository::new());
        projects.insert(project.clone());
        let donations = Arc::new(InMemoryDonationRepository::new(projects.clone()));
        let gateway = Arc::new(MockPaymentGateway::new());

        let state = DonationAppState {
            donations,
            projects,
            users: Arc::new(InMemoryUserDirectory::new()),
            gateway: gateway.clone(),
            public_base_url: "https://hopelink.example.org".to_string(),
        };
        (state, project, gateway)
    }

    fn checkout_request(project_id: &str) -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            amount: Some(25.0),
            project_id: project_id.to_string(),
            donor_name: "Jane Doe".to_string(),
            donor_email: "jane@example.com".to_string(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Handler Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_checkout_returns_created() {
        let (state, project, _gateway) = test_state();

        let result = create_checkout(
            State(state),
            None,
            Json(checkout_request(&project.id.to_string())),
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn create_checkout_rejects_missing_amount() {
        let (state, project, _gateway) = test_state();
        let mut request = checkout_request(&project.id.to_string());
        request.amount = None;

        let result = create_checkout(State(state), None, Json(request)).await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_checkout_rejects_malformed_project_id() {
        let (state, _project, _gateway) = test_state();

        let result = create_checkout(State(state), None, Json(checkout_request("p1"))).await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_checkout_unknown_project_is_404() {
        let (state, _project, _gateway) = test_state();

        let result = create_checkout(
            State(state),
            None,
            Json(checkout_request(&ProjectId::new().to_string())),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn poll_confirmation_requires_session_id() {
        let (state, _project, _gateway) = test_state();

        let result = poll_confirmation(
            State(state),
            Query(ConfirmQuery {
                session_id: String::new(),
            }),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn poll_confirmation_unknown_session_is_404() {
        let (state, _project, _gateway) = test_state();

        let result = poll_confirmation(
            State(state),
            Query(ConfirmQuery {
                session_id: "cs_unknown".to_string(),
            }),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn webhook_without_signature_header_is_unauthorized() {
        let (state, _project, _gateway) = test_state();

        let result = handle_stripe_webhook(
            State(state),
            axum::http::HeaderMap::new(),
            axum::body::Bytes::from_static(b"{}"),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn recent_donations_accepts_missing_scope() {
        let (state, _project, _gateway) = test_state();

        let result = recent_donations(
            State(state),
            Query(RecentQuery {
                project_id: None,
                limit: None,
            }),
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn stats_rejects_malformed_project_scope() {
        let (state, _project, _gateway) = test_state();

        let result = donation_stats(
            State(state),
            Query(StatsQuery {
                project_id: Some("nope".to_string()),
            }),
        )
        .await;

        let response = result.err().unwrap().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn api_error_maps_project_not_found_to_404() {
        let err = DonationApiError(DonationError::project_not_found(ProjectId::new()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_session_not_found_to_404() {
        let err = DonationApiError(DonationError::session_not_found("cs_1"));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_validation_to_400() {
        let err = DonationApiError(DonationError::validation("amount", "too small"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_invalid_signature_to_401() {
        let err = DonationApiError(DonationError::invalid_webhook_signature());
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn api_error_maps_unconfirmable_to_500() {
        let err = DonationApiError(DonationError::unconfirmable("cs_1", "bad metadata"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn api_error_maps_gateway_failure_to_502() {
        let err = DonationApiError(DonationError::gateway_failure("timeout"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn api_error_maps_infrastructure_to_500() {
        let err = DonationApiError(DonationError::infrastructure("pool exhausted"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
