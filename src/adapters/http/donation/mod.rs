//! HTTP surface for the donation flow.
//!
//! - `dto` - request/response shapes (camelCase JSON, matching the web app)
//! - `handlers` - axum handlers and error mapping
//! - `routes` - router assembly

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::DonationAppState;
pub use routes::api_router;
