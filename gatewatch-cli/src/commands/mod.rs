//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`bases`] - List configured bases
//! - [`config`] - Configuration management (init, path, show)
//! - [`fetch`] - One aircraft lookup through the cache
//! - [`gates`] - Gate occupancy at one base
//! - [`serve`] - HTTP API with background pollers

pub mod bases;
pub mod config;
pub mod fetch;
pub mod gates;
pub mod serve;

use gatewatch::cache::validate_radius;

use crate::error::CliError;

/// Radius from `--radius`, or the configured default, checked the same way
/// the HTTP API checks `radiusNm`.
pub(crate) fn resolve_radius(arg: Option<f64>, default: f64) -> Result<f64, CliError> {
    validate_radius(arg.unwrap_or(default)).map_err(|e| CliError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_radius() {
        assert_eq!(resolve_radius(None, 50.0).unwrap(), 50.0);
        assert_eq!(resolve_radius(Some(12.5), 50.0).unwrap(), 12.5);

        assert!(resolve_radius(Some(-3.0), 50.0).is_err());
        assert!(resolve_radius(Some(0.04), 50.0).is_err());
        assert!(resolve_radius(Some(1e12), 50.0).is_err());
    }
}
