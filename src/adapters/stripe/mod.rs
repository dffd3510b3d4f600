//! Stripe payment gateway adapter.
//!
//! - `stripe_gateway` - `PaymentGateway` implementation over the Stripe API
//! - `webhook_types` - wire types and signature-header parsing
//! - `mock_gateway` - in-memory gateway for tests and local development

mod mock_gateway;
mod stripe_gateway;
pub mod webhook_types;

pub use mock_gateway::MockPaymentGateway;
pub use stripe_gateway::{StripeConfig, StripeGateway};
