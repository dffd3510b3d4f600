//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentGateway` - checkout-session creation, lookup, webhook verification
//! - `DonationRepository` - the donation ledger and funding aggregate
//! - `ProjectRepository` - project lookup
//! - `UserDirectory` - user-existence checks for metadata verification

mod donation_repository;
mod payment_gateway;
mod project_repository;
mod user_directory;

pub use donation_repository::{DonationRepository, DonationStatistics, RecordOutcome};
pub use payment_gateway::{
    CheckoutSessionRequest, GatewayError, GatewayErrorCode, GatewayEvent, GatewayEventType,
    GatewaySession, PaymentGateway, PaymentStatus,
};
pub use project_repository::ProjectRepository;
pub use user_directory::UserDirectory;
