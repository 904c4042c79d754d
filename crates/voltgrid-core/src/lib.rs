//! Voltgrid Core - Domain models, errors, and configuration
//!
//! This crate contains the station/address/charging domain model, the
//! merge configuration (including per-country source priorities), and the
//! shared error type.

pub mod config;
pub mod error;
pub mod models;
pub mod sources;

pub use error::{Result, VoltgridError};
