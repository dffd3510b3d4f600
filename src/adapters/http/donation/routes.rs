//! Axum router configuration for the donation endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_checkout, donation_history, donation_stats, handle_stripe_webhook, poll_confirmation,
    recent_donations, DonationAppState,
};

/// Create the donation API router.
///
/// # Routes
///
/// - `POST /checkout` - start a hosted checkout (auth optional)
/// - `GET /confirm?session_id=` - polling confirmation after redirect
/// - `GET /history` - authenticated user's donation history
/// - `GET /recent?projectId=&limit=` - recent completed donations
/// - `GET /stats?projectId=` - aggregate statistics
pub fn donation_routes() -> Router<DonationAppState> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/confirm", get(poll_confirmation))
        .route("/history", get(donation_history))
        .route("/recent", get(recent_donations))
        .route("/stats", get(donation_stats))
}

/// Create the webhook router.
///
/// Separate from the donation routes because webhooks carry no user
/// authentication; they are verified via the provider signature.
///
/// # Routes
/// - `POST /stripe` - gateway push confirmation
pub fn webhook_routes() -> Router<DonationAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Create the complete API router, suitable for mounting at `/api`.
pub fn api_router() -> Router<DonationAppState> {
    Router::new()
        .nest("/donations", donation_routes())
        .nest("/webhooks", webhook_routes())
}
