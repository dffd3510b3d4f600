//! Command and query handlers, one per use case.

pub mod donation;
