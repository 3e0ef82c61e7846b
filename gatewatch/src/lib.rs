//! gatewatch - ramp tracking for a regional airline fleet
//!
//! This library polls OpenSky Network state vectors around configured airport
//! bases, keeps the results in a two-tier cache with upstream backoff, and
//! derives gate occupancy and short movement trails for fleet aircraft.
//!
//! # High-Level API
//!
//! The [`cache::CacheCoordinator`] is the entry point for aircraft lookups:
//!
//! ```ignore
//! use std::sync::Arc;
//! use gatewatch::cache::CacheCoordinator;
//! use gatewatch::config::ConfigFile;
//! use gatewatch::opensky::{ReqwestTransport, TelemetryClient};
//! use gatewatch::store::MemoryStore;
//! use gatewatch::time::SystemClock;
//!
//! let config = ConfigFile::load()?.with_env_overrides();
//! let clock = Arc::new(SystemClock);
//! let coordinator = CacheCoordinator::new(
//!     TelemetryClient::new(ReqwestTransport::new()?, config.opensky_config(), clock.clone()),
//!     Arc::new(MemoryStore::new()),
//!     config.airport_registry(),
//!     config.cache_policy(),
//!     clock,
//! );
//!
//! let response = coordinator.get_aircraft("SAV", 50.0, false).await?;
//! ```

pub mod aircraft;
pub mod airport;
pub mod cache;
pub mod config;
pub mod geo;
pub mod layout;
pub mod logging;
pub mod opensky;
pub mod server;
pub mod store;
pub mod time;
pub mod tracking;

/// Version of the gatewatch library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
