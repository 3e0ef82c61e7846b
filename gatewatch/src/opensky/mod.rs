//! OpenSky Network telemetry acquisition.
//!
//! # Architecture
//!
//! ```text
//! CacheCoordinator
//!     │
//!     └── StateSource trait → TelemetryClient
//!             │
//!             ├── TokenManager (client-credentials, cached bearer token)
//!             │
//!             └── HttpTransport trait → ReqwestTransport
//! ```
//!
//! The client fetches raw state vectors for a bounding box, retries once with
//! a refreshed token on HTTP 401, and normalizes the positional vectors into
//! [`AircraftSnapshot`](crate::aircraft::AircraftSnapshot) records.

mod client;
mod config;
mod error;
mod http;
mod token;
mod vector;

pub use client::{StateSource, TelemetryClient};
pub use config::{
    ClientCredentials, OpenSkyConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_URL,
};
pub use error::{truncate_body, TelemetryError, BODY_SNIPPET_LEN};
pub use http::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use token::TokenManager;
pub use vector::{normalize, StateVector, STATES_SOURCE};
