//! Airport bases.
//!
//! A base is an airport at which fleet traffic is tracked. Bases are fixed
//! at process start from configuration and looked up by their three-letter
//! code for every poll.
//!
//! # Example
//!
//! ```ignore
//! use gatewatch::airport::AirportRegistry;
//!
//! let registry = AirportRegistry::with_defaults();
//! if let Some(base) = registry.get("sav") {
//!     println!("{} is at ({}, {})", base.icao_code, base.lat, base.lon);
//! }
//! ```

mod registry;

use serde::Serialize;

use crate::geo::GeoPoint;

pub use registry::{AirportRegistry, BaseParseError};

/// An airport base with code and location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportBase {
    /// Three-letter code (e.g. "SAV"), uppercase.
    pub code: String,
    /// ICAO code (e.g. "KSAV").
    pub icao_code: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl AirportBase {
    pub fn new(code: &str, icao_code: &str, lat: f64, lon: f64) -> Self {
        Self {
            code: code.trim().to_uppercase(),
            icao_code: icao_code.trim().to_uppercase(),
            lat,
            lon,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Parse a configuration value of the form `ICAO,lat,lon`.
    pub fn parse_entry(code: &str, value: &str) -> Result<Self, BaseParseError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(BaseParseError::InvalidCode(code.to_string()));
        }

        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        let [icao, lat, lon] = parts.as_slice() else {
            return Err(BaseParseError::InvalidFormat(value.to_string()));
        };

        if icao.is_empty() {
            return Err(BaseParseError::InvalidFormat(value.to_string()));
        }

        let lat: f64 = lat
            .parse()
            .map_err(|_| BaseParseError::InvalidCoordinate(lat.to_string()))?;
        let lon: f64 = lon
            .parse()
            .map_err(|_| BaseParseError::InvalidCoordinate(lon.to_string()))?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(BaseParseError::InvalidCoordinate(format!("{lat},{lon}")));
        }

        Ok(Self::new(code, icao, lat, lon))
    }

    /// Configuration value for this base, inverse of [`parse_entry`](Self::parse_entry).
    pub fn to_entry(&self) -> String {
        format!("{},{},{}", self.icao_code, self.lat, self.lon)
    }
}
