//! Donation domain module.
//!
//! Handles the donation ledger: the Donation aggregate, the ephemeral
//! DonationIntent carried through the payment gateway's session metadata,
//! and donation-specific errors.
//!
//! # Module Structure
//!
//! - `donation` - Donation aggregate entity and status
//! - `intent` - DonationIntent and the session-metadata codec
//! - `errors` - DonationError taxonomy

mod donation;
mod errors;
mod intent;

pub use donation::{Donation, DonationStatus};
pub use errors::DonationError;
pub use intent::{DonationIntent, MetadataError, SessionMetadata};
