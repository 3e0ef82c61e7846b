//! Callsign allow-list filtering.
//!
//! Traffic is attributed to the operating airline by ICAO callsign prefix
//! (the carrier plus any regional partners flying under its code).

use super::model::AircraftSnapshot;

/// Uppercase and trim a callsign; empty results become `None`.
pub fn normalize_callsign(callsign: Option<&str>) -> Option<String> {
    let normalized = callsign?.trim().to_uppercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Keep only snapshots whose callsign starts with one of `prefixes`.
///
/// Matching is done on the normalized callsign and the returned snapshots
/// carry that normalized form. Records without a callsign are dropped since
/// they cannot be attributed to any fleet.
pub fn filter_allowed<P: AsRef<str>>(
    snapshots: &[AircraftSnapshot],
    prefixes: &[P],
) -> Vec<AircraftSnapshot> {
    let prefixes: Vec<String> = prefixes
        .iter()
        .map(|p| p.as_ref().trim().to_uppercase())
        .filter(|p| !p.is_empty())
        .collect();

    snapshots
        .iter()
        .filter_map(|snapshot| {
            let callsign = normalize_callsign(snapshot.callsign.as_deref())?;
            if !prefixes.iter().any(|p| callsign.starts_with(p.as_str())) {
                return None;
            }
            Some(AircraftSnapshot {
                callsign: Some(callsign),
                ..snapshot.clone()
            })
        })
        .collect()
}
