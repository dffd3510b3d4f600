//! InitiateCheckoutHandler - Command handler for starting a donation checkout.

use std::sync::Arc;

use crate::domain::donation::{DonationError, DonationIntent, SessionMetadata};
use crate::domain::foundation::{ProjectId, UserId};
use crate::ports::{CheckoutSessionRequest, PaymentGateway, ProjectRepository};

/// Command to start a hosted checkout for a donation.
#[derive(Debug, Clone)]
pub struct InitiateCheckoutCommand {
    pub amount: f64,
    pub project_id: ProjectId,
    pub donor_name: String,
    pub donor_email: String,
    /// Supplied by the surrounding auth collaborator, absent for anonymous
    /// donors.
    pub user_id: Option<UserId>,
}

/// Result of successful checkout initiation.
#[derive(Debug, Clone)]
pub struct InitiateCheckoutResult {
    /// Gateway session reference for the polling confirmation endpoint.
    pub session_ref: String,
    /// Hosted payment page the donor is redirected to.
    pub checkout_url: Option<String>,
}

/// Handler for initiating a donation checkout.
///
/// Validates the intent, resolves the target project, and asks the gateway
/// for a checkout session with the intent embedded as metadata. Deliberately
/// persists nothing: the donation row is created at confirmation, never here.
pub struct InitiateCheckoutHandler {
    gateway: Arc<dyn PaymentGateway>,
    projects: Arc<dyn ProjectRepository>,
    /// Public base URL of the web application, for redirect targets.
    public_base_url: String,
}

impl InitiateCheckoutHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        projects: Arc<dyn ProjectRepository>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            projects,
            public_base_url: public_base_url.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: InitiateCheckoutCommand,
    ) -> Result<InitiateCheckoutResult, DonationError> {
        // 1. Validate the intent (amount minimum, non-empty donor fields)
        let intent = DonationIntent::new(
            cmd.amount,
            cmd.project_id,
            cmd.donor_name,
            cmd.donor_email,
            cmd.user_id,
        )
        .map_err(|e| DonationError::validation(field_of(&e), e.to_string()))?;

        // 2. The target project must exist
        let project = self
            .projects
            .find_by_id(&intent.project_id)
            .await?
            .ok_or_else(|| DonationError::project_not_found(intent.project_id))?;

        // 3. Create the gateway session carrying the intent as metadata
        let request = CheckoutSessionRequest {
            amount_minor: intent.amount.as_minor_units(),
            description: format!("Donation to {}", project.title),
            customer_email: intent.donor_email.clone(),
            metadata: SessionMetadata::encode(&intent),
            success_url: format!(
                "{}/donations/success?session_id={{CHECKOUT_SESSION_ID}}",
                self.public_base_url
            ),
            cancel_url: format!("{}/donations", self.public_base_url),
        };

        let session = self
            .gateway
            .create_checkout_session(request)
            .await
            .map_err(|e| DonationError::gateway_failure(e.to_string()))?;

        tracing::info!(
            session_ref = %session.id,
            project_id = %intent.project_id,
            amount = %intent.amount,
            "Checkout session created"
        );

        Ok(InitiateCheckoutResult {
            session_ref: session.id,
            checkout_url: session.url,
        })
    }
}

fn field_of(err: &crate::domain::foundation::ValidationError) -> String {
    use crate::domain::foundation::ValidationError;
    match err {
        ValidationError::EmptyField { field }
        | ValidationError::BelowMinimum { field, .. }
        | ValidationError::InvalidFormat { field, .. } => field.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, Timestamp};
    use crate::domain::project::{Project, ProjectStatus};
    use crate::ports::{GatewayError, GatewayEvent, GatewaySession, PaymentStatus};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockProjectRepository {
        project: Option<Project>,
    }

    #[async_trait]
    impl ProjectRepository for MockProjectRepository {
        async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DomainError> {
            Ok(self.project.clone().filter(|p| &p.id == id))
        }
    }

    struct MockGateway {
        fail_create: bool,
        last_request: Mutex<Option<CheckoutSessionRequest>>,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                fail_create: false,
                last_request: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                fail_create: true,
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn create_checkout_session(
            &self,
            request: CheckoutSessionRequest,
        ) -> Result<GatewaySession, GatewayError> {
            if self.fail_create {
                return Err(GatewayError::network("connection refused"));
            }
            let metadata = request.metadata.clone();
            *self.last_request.lock().unwrap() = Some(request);
            Ok(GatewaySession {
                id: "cs_test_123".to_string(),
                url: Some("https://checkout.stripe.com/c/pay/cs_test_123".to_string()),
                payment_status: PaymentStatus::Unpaid,
                metadata,
            })
        }

        async fn retrieve_session(
            &self,
            _session_ref: &str,
        ) -> Result<Option<GatewaySession>, GatewayError> {
            Ok(None)
        }

        async fn verify_webhook(
            &self,
            _payload: &[u8],
            _signature: &str,
        ) -> Result<GatewayEvent, GatewayError> {
            Err(GatewayError::invalid_webhook("not implemented in mock"))
        }
    }

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

    fn test_command(project_id: ProjectId) -> InitiateCheckoutCommand {
        InitiateCheckoutCommand {
            amount: 25.0,
            project_id,
            donor_name: "Jane Doe".to_string(),
            donor_email: "jane@example.com".to_string(),
            user_id: None,
        }
    }

    fn handler_with(
        gateway: Arc<MockGateway>,
        project: Option<Project>,
    ) -> InitiateCheckoutHandler {
        InitiateCheckoutHandler::new(
            gateway,
            Arc::new(MockProjectRepository { project }),
            "https://hopelink.example.org",
        )
    }

    #[tokio::test]
    async fn returns_session_ref_and_checkout_url() {
        let project = test_project();
        let gateway = Arc::new(MockGateway::new());
        let handler = handler_with(gateway.clone(), Some(project.clone()));

        let result = handler.handle(test_command(project.id)).await.unwrap();

        assert_eq!(result.session_ref, "cs_test_123");
        assert!(result.checkout_url.unwrap().contains("cs_test_123"));
    }

    #[tokio::test]
    async fn embeds_intent_in_session_metadata() {
        let project = test_project();
        let gateway = Arc::new(MockGateway::new());
        let handler = handler_with(gateway.clone(), Some(project.clone()));

        handler.handle(test_command(project.id)).await.unwrap();

        let request = gateway.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.amount_minor, 2500);
        assert_eq!(request.metadata.get("donorName").unwrap(), "Jane Doe");
        assert_eq!(request.metadata.get("amount").unwrap(), "25.00");
        assert_eq!(
            request.metadata.get("projectId").unwrap(),
            &project.id.to_string()
        );
        assert_eq!(request.metadata.get("userId").unwrap(), "");
    }

    #[tokio::test]
    async fn builds_redirect_urls_from_public_base() {
        let project = test_project();
        let gateway = Arc::new(MockGateway::new());
        let handler = handler_with(gateway.clone(), Some(project.clone()));

        handler.handle(test_command(project.id)).await.unwrap();

        let request = gateway.last_request.lock().unwrap().clone().unwrap();
        assert!(request
            .success_url
            .starts_with("https://hopelink.example.org/donations/success"));
        assert!(request.success_url.contains("{CHECKOUT_SESSION_ID}"));
        assert_eq!(
            request.cancel_url,
            "https://hopelink.example.org/donations"
        );
    }

    #[tokio::test]
    async fn fails_validation_for_small_amount() {
        let project = test_project();
        let handler = handler_with(Arc::new(MockGateway::new()), Some(project.clone()));

        let mut cmd = test_command(project.id);
        cmd.amount = 0.5;

        let result = handler.handle(cmd).await;
        assert!(matches!(
            result,
            Err(DonationError::ValidationFailed { ref field, .. }) if field == "amount"
        ));
    }

    #[tokio::test]
    async fn fails_validation_for_blank_donor_name() {
        let project = test_project();
        let handler = handler_with(Arc::new(MockGateway::new()), Some(project.clone()));

        let mut cmd = test_command(project.id);
        cmd.donor_name = "   ".to_string();

        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(DonationError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn fails_with_not_found_for_unknown_project() {
        let handler = handler_with(Arc::new(MockGateway::new()), None);

        let result = handler.handle(test_command(ProjectId::new())).await;
        assert!(matches!(result, Err(DonationError::ProjectNotFound(_))));
    }

    #[tokio::test]
    async fn surfaces_gateway_failure_without_side_effects() {
        let project = test_project();
        let gateway = Arc::new(MockGateway::failing());
        let handler = handler_with(gateway.clone(), Some(project.clone()));

        let result = handler.handle(test_command(project.id)).await;
        assert!(matches!(result, Err(DonationError::GatewayFailure { .. })));
        assert!(gateway.last_request.lock().unwrap().is_none());
    }
}
