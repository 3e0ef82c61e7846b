//! HTTP request handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::error::ApiError;
use super::AppState;
use crate::airport::AirportBase;
use crate::cache::{validate_radius, AircraftResponse, CacheStatsSnapshot, FetchSource};
use crate::layout::{build_gate_board, GateOccupancy, LayoutStore, TaxiAssignment};
use crate::opensky::StateSource;
use crate::store::DurableStore;
use crate::tracking::TrailPoint;

/// Query string for the aircraft and gate endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyParams {
    radius_nm: Option<String>,
    force: Option<String>,
    debug: Option<String>,
}

/// Parse `radiusNm`, falling back to `default` when absent.
pub(crate) fn parse_radius(raw: Option<&str>, default: f64) -> Result<f64, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };

    let radius: f64 = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("radiusNm must be a number, got '{raw}'")))?;

    validate_radius(radius).map_err(|e| ApiError::BadRequest(format!("radiusNm: {e}")))
}

/// Parse a boolean flag. A bare `?force` counts as true.
pub(crate) fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool, ApiError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None => Ok(false),
        Some("" | "1" | "true" | "yes") => Ok(true),
        Some("0" | "false" | "no") => Ok(false),
        Some(other) => Err(ApiError::BadRequest(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

#[instrument(skip_all, fields(base = %base))]
pub async fn nearby_aircraft<S, D, L>(
    State(state): State<Arc<AppState<S, D, L>>>,
    Path(base): Path<String>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<AircraftResponse>, ApiError>
where
    S: StateSource + 'static,
    D: DurableStore + 'static,
    L: LayoutStore + 'static,
{
    let radius = parse_radius(params.radius_nm.as_deref(), state.default_radius_nm)?;
    let force = parse_flag("force", params.force.as_deref())?;
    let debug = parse_flag("debug", params.debug.as_deref())?;

    let response = state.coordinator.get_aircraft(&base, radius, force).await?;

    if state.request_driven_trails {
        if let Some(trails) = state.trails(&response.airport) {
            trails.update(&response.aircraft, state.coordinator.clock().now());
        }
    }

    debug!(
        source = %response.source,
        stale = response.stale,
        aircraft = response.aircraft.len(),
        "Served nearby aircraft"
    );

    Ok(Json(if debug {
        response
    } else {
        response.without_debug()
    }))
}

/// Gate occupancy for one base.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatesResponse {
    pub airport: String,
    pub gates: Vec<GateOccupancy>,
    pub taxi: Vec<TaxiAssignment>,
    pub stale: bool,
    pub source: FetchSource,
    pub updated_at: DateTime<Utc>,
}

#[instrument(skip_all, fields(base = %base))]
pub async fn gates<S, D, L>(
    State(state): State<Arc<AppState<S, D, L>>>,
    Path(base): Path<String>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<GatesResponse>, ApiError>
where
    S: StateSource + 'static,
    D: DurableStore + 'static,
    L: LayoutStore + 'static,
{
    let radius = parse_radius(params.radius_nm.as_deref(), state.default_radius_nm)?;
    let response = state.coordinator.get_aircraft(&base, radius, false).await?;
    let layout = state.layouts.load(&response.airport).await?;

    let board = build_gate_board(&response.aircraft, &layout);

    Ok(Json(GatesResponse {
        airport: response.airport,
        gates: board.gates,
        taxi: board.taxi,
        stale: response.stale,
        source: response.source,
        updated_at: response.updated_at,
    }))
}

/// Current trails for one base.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailsResponse {
    pub airport: String,
    pub trails: BTreeMap<String, Vec<TrailPoint>>,
    pub generated_at: DateTime<Utc>,
}

pub async fn trails<S, D, L>(
    State(state): State<Arc<AppState<S, D, L>>>,
    Path(base): Path<String>,
) -> Result<Json<TrailsResponse>, ApiError>
where
    S: StateSource + 'static,
    D: DurableStore + 'static,
    L: LayoutStore + 'static,
{
    let airport = state
        .coordinator
        .registry()
        .get(&base)
        .ok_or_else(|| ApiError::UnknownBase(base.trim().to_uppercase()))?;
    let now = state.coordinator.clock().now();

    let trails = state
        .trails(&airport.code)
        .map(|tracker| tracker.all(now))
        .unwrap_or_default();

    Ok(Json(TrailsResponse {
        airport: airport.code.clone(),
        trails,
        generated_at: now,
    }))
}

pub async fn bases<S, D, L>(State(state): State<Arc<AppState<S, D, L>>>) -> Json<Vec<AirportBase>>
where
    S: StateSource + 'static,
    D: DurableStore + 'static,
    L: LayoutStore + 'static,
{
    Json(state.coordinator.registry().iter().cloned().collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub in_flight: usize,
    pub cache: CacheStatsSnapshot,
}

pub async fn health<S, D, L>(State(state): State<Arc<AppState<S, D, L>>>) -> Json<HealthResponse>
where
    S: StateSource + 'static,
    D: DurableStore + 'static,
    L: LayoutStore + 'static,
{
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        in_flight: state.coordinator.in_flight_count(),
        cache: state.coordinator.stats().snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_radius() {
        assert_eq!(parse_radius(None, 50.0).unwrap(), 50.0);
        assert_eq!(parse_radius(Some(""), 50.0).unwrap(), 50.0);
        assert_eq!(parse_radius(Some("500"), 50.0).unwrap(), 500.0);
        assert!(parse_radius(Some("abc"), 50.0).is_err());
        assert!(parse_radius(Some("0"), 50.0).is_err());
        assert!(parse_radius(Some("-5"), 50.0).is_err());
        assert!(parse_radius(Some("NaN"), 50.0).is_err());
        assert!(parse_radius(Some("1000.1"), 50.0).is_err());
        assert!(parse_radius(Some("0.04"), 50.0).is_err());
        assert_eq!(parse_radius(Some("0.05"), 50.0).unwrap(), 0.05);
    }

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag("force", None).unwrap());
        assert!(parse_flag("force", Some("")).unwrap());
        assert!(parse_flag("force", Some("TRUE")).unwrap());
        assert!(parse_flag("force", Some("1")).unwrap());
        assert!(!parse_flag("force", Some("0")).unwrap());
        assert!(matches!(
            parse_flag("force", Some("maybe")),
            Err(ApiError::BadRequest(_))
        ));
    }
}
