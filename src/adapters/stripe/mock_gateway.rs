//! In-memory payment gateway for tests and local development.
//!
//! Sessions are created unpaid; tests drive them to paid or expired with the
//! `mark_paid`/`mark_expired` helpers, mimicking the donor completing or
//! abandoning checkout at the hosted page.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{
    CheckoutSessionRequest, GatewayError, GatewayEvent, GatewayEventType, GatewaySession,
    PaymentGateway, PaymentStatus,
};

/// In-memory `PaymentGateway` implementation.
pub struct MockPaymentGateway {
    sessions: Mutex<HashMap<String, GatewaySession>>,
    counter: AtomicU64,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Simulate the donor completing payment for a session.
    ///
    /// Returns false when the session is unknown.
    pub fn mark_paid(&self, session_ref: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(session_ref) {
            Some(session) => {
                session.payment_status = PaymentStatus::Paid;
                session.url = None;
                true
            }
            None => false,
        }
    }

    /// Simulate the session expiring without payment.
    pub fn mark_expired(&self, session_ref: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(session_ref) {
            Some(session) => {
                session.payment_status = PaymentStatus::Expired;
                session.url = None;
                true
            }
            None => false,
        }
    }

    /// Build the webhook event the gateway would push for a session in its
    /// current state. Signature verification always succeeds in the mock.
    pub fn completed_event_for(&self, session_ref: &str) -> Option<GatewayEvent> {
        let sessions = self.sessions.lock().unwrap();
        let session = sessions.get(session_ref)?.clone();
        let id = format!("evt_mock_{}", self.counter.fetch_add(1, Ordering::SeqCst));
        Some(GatewayEvent {
            id,
            event_type: GatewayEventType::CheckoutSessionCompleted,
            session: Some(session),
            created_at: chrono::Utc::now().timestamp(),
        })
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<GatewaySession, GatewayError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let id = format!("cs_mock_{}", n);
        let session = GatewaySession {
            id: id.clone(),
            url: Some(format!("https://checkout.example.test/c/pay/{}", id)),
            payment_status: PaymentStatus::Unpaid,
            metadata: request.metadata,
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_session(
        &self,
        session_ref: &str,
    ) -> Result<Option<GatewaySession>, GatewayError> {
        Ok(self.sessions.lock().unwrap().get(session_ref).cloned())
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        _signature: &str,
    ) -> Result<GatewayEvent, GatewayError> {
        // The mock accepts any signature and parses the payload as a
        // pre-built GatewayEvent
        serde_json::from_slice(payload)
            .map_err(|e| GatewayError::invalid_webhook(format!("Invalid mock payload: {}", e)))
    }
}
