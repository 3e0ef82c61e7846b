//! Aircraft records and fleet filtering.
//!
//! - [`model`] - `AircraftSnapshot` and its derived `AircraftStatus`
//! - [`filter`] - callsign allow-list filtering

mod filter;
mod model;

pub use filter::{filter_allowed, normalize_callsign};
pub use model::{AircraftSnapshot, AircraftStatus, DEFAULT_LANDED_MAX_KTS, MS_TO_KNOTS};
