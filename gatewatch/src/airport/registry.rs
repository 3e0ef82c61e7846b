//! Base registry for O(1) code lookup.

use std::collections::BTreeMap;

use super::AirportBase;

/// Error type for base configuration entries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BaseParseError {
    #[error("Invalid base code '{0}': expected three letters")]
    InvalidCode(String),
    #[error("Invalid base entry '{0}': expected ICAO,lat,lon")]
    InvalidFormat(String),
    #[error("Invalid coordinate '{0}'")]
    InvalidCoordinate(String),
}

/// Built-in bases used when the configuration lists none.
const DEFAULT_BASES: &[(&str, &str, f64, f64)] = &[
    ("SAV", "KSAV", 32.1276, -81.2021),
    ("CLT", "KCLT", 35.2140, -80.9431),
    ("PHL", "KPHL", 39.8744, -75.2424),
    ("DCA", "KDCA", 38.8521, -77.0377),
    ("DAY", "KDAY", 39.9024, -84.2194),
];

/// Immutable set of bases keyed by code.
///
/// Ordered by code so listings are stable.
#[derive(Debug, Clone, Default)]
pub struct AirportRegistry {
    bases: BTreeMap<String, AirportBase>,
}

impl AirportRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in bases.
    pub fn with_defaults() -> Self {
        DEFAULT_BASES
            .iter()
            .map(|(code, icao, lat, lon)| AirportBase::new(code, icao, *lat, *lon))
            .collect()
    }

    /// Add a base, replacing any existing base with the same code.
    pub fn insert(&mut self, base: AirportBase) {
        self.bases.insert(base.code.clone(), base);
    }

    /// Get a base by code, case-insensitive.
    pub fn get(&self, code: &str) -> Option<&AirportBase> {
        self.bases.get(&code.trim().to_uppercase())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Bases in code order.
    pub fn iter(&self) -> impl Iterator<Item = &AirportBase> {
        self.bases.values()
    }

    pub fn codes(&self) -> Vec<String> {
        self.bases.keys().cloned().collect()
    }
}

impl FromIterator<AirportBase> for AirportRegistry {
    fn from_iter<I: IntoIterator<Item = AirportBase>>(iter: I) -> Self {
        let mut registry = Self::new();
        for base in iter {
            registry.insert(base);
        }
        registry
    }
}
