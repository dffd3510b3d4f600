//! HopeLink - NGO project and donation management backend
//!
//! This crate implements donation checkout against a payment gateway and the
//! dual-entry (polling + webhook) reconciliation flow that records each
//! completed payment exactly once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
