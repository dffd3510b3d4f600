//! Donation use-case handlers.
//!
//! - `initiate_checkout` - start a hosted checkout for a donation intent
//! - `confirm_donation` - the idempotent confirmation shared by both
//!   reconciliation entry points
//! - `handle_payment_webhook` - gateway push entry point
//! - `list_donations` / `get_donation_stats` - ledger queries

mod confirm_donation;
mod get_donation_stats;
mod handle_payment_webhook;
mod initiate_checkout;
mod list_donations;

pub use confirm_donation::{
    ConfirmDonationCommand, ConfirmDonationHandler, ConfirmDonationResult, ConfirmOutcome,
};
pub use get_donation_stats::{DonationStatsResult, GetDonationStatsHandler, GetDonationStatsQuery, GoalProgress};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandleWebhookResult,
};
pub use initiate_checkout::{InitiateCheckoutCommand, InitiateCheckoutHandler, InitiateCheckoutResult};
pub use list_donations::{
    ListRecentDonationsHandler, ListRecentDonationsQuery, ListUserDonationsHandler,
    ListUserDonationsQuery,
};
