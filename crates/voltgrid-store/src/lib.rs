//! Voltgrid Store - Storage port and adapters
//!
//! This crate defines the `StationStore` port the merge engine runs
//! against, and provides a PostgreSQL/PostGIS adapter for production plus
//! an in-memory adapter for development and tests.

pub mod memory;
pub mod ports;
pub mod postgres;

pub use memory::MemoryStationStore;
pub use ports::StationStore;
pub use postgres::{PostgresConfig, PostgresStore};
