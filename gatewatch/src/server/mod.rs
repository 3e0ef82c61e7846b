//! HTTP poll API.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /aircraft/nearby/{base}?radiusNm=&force=&debug=` | fleet aircraft near a base |
//! | `GET /gates/{base}?radiusNm=` | gate occupancy and taxi-node association |
//! | `GET /trails/{base}` | recent trails of moving aircraft |
//! | `GET /bases` | configured bases |
//! | `GET /health` | liveness and cache counters |
//!
//! Upstream trouble never surfaces as an HTTP error: the aircraft endpoint
//! answers 200 with `stale` and a descriptive `source`. Only an unknown base
//! (404) or malformed parameters (400) are rejected.

mod error;
mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cache::CacheCoordinator;
use crate::layout::LayoutStore;
use crate::opensky::StateSource;
use crate::store::DurableStore;
use crate::tracking::TrailTracker;

pub use error::ApiError;
pub use handlers::{GatesResponse, HealthResponse, NearbyParams, TrailsResponse};

/// Shared state behind every handler.
pub struct AppState<S: StateSource, D: DurableStore, L: LayoutStore> {
    pub coordinator: Arc<CacheCoordinator<S, D>>,
    pub layouts: L,
    /// One tracker per configured base, keyed by base code.
    trails: HashMap<String, Arc<TrailTracker>>,
    /// Radius used when a request omits `radiusNm`.
    pub default_radius_nm: f64,
    /// Feed trails from client requests. Set when no background poller runs.
    pub request_driven_trails: bool,
}

impl<S: StateSource, D: DurableStore, L: LayoutStore> AppState<S, D, L> {
    /// State with a fresh trail tracker for every base the coordinator knows.
    pub fn new(coordinator: Arc<CacheCoordinator<S, D>>, layouts: L, default_radius_nm: f64) -> Self {
        let trails = coordinator
            .registry()
            .iter()
            .map(|base| (base.code.clone(), Arc::new(TrailTracker::new())))
            .collect();

        Self {
            coordinator,
            layouts,
            trails,
            default_radius_nm,
            request_driven_trails: false,
        }
    }

    pub fn with_request_driven_trails(mut self, enabled: bool) -> Self {
        self.request_driven_trails = enabled;
        self
    }

    /// Trail tracker for a base code.
    pub fn trails(&self, base: &str) -> Option<&Arc<TrailTracker>> {
        self.trails.get(&base.trim().to_uppercase())
    }
}

/// Build the API router.
pub fn router<S, D, L>(state: Arc<AppState<S, D, L>>) -> Router
where
    S: StateSource + 'static,
    D: DurableStore + 'static,
    L: LayoutStore + 'static,
{
    Router::new()
        .route(
            "/aircraft/nearby/{base}",
            get(handlers::nearby_aircraft::<S, D, L>),
        )
        .route("/gates/{base}", get(handlers::gates::<S, D, L>))
        .route("/trails/{base}", get(handlers::trails::<S, D, L>))
        .route("/bases", get(handlers::bases::<S, D, L>))
        .route("/health", get(handlers::health::<S, D, L>))
        .with_state(state)
}

/// Serve `app` until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "HTTP API listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::{AircraftSnapshot, AircraftStatus};
    use crate::airport::AirportRegistry;
    use crate::cache::CachePolicy;
    use crate::geo::{BoundingBox, GeoPoint};
    use crate::layout::{GateRecord, Layout, StaticLayoutStore};
    use crate::opensky::TelemetryError;
    use crate::store::MemoryStore;
    use crate::time::ManualClock;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, Utc};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const GATE: GeoPoint = GeoPoint {
        lat: 32.1280,
        lon: -81.2010,
    };

    struct FixedSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StateSource for FixedSource {
        async fn fetch_aircraft(
            &self,
            _bbox: &BoundingBox,
        ) -> Result<Vec<AircraftSnapshot>, TelemetryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TelemetryError::Timeout);
            }
            let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
            let snapshot = |icao24: &str, callsign: &str, speed: f64| AircraftSnapshot {
                icao24: icao24.to_string(),
                callsign: Some(callsign.to_string()),
                lat: GATE.lat,
                lon: GATE.lon,
                on_ground: true,
                ground_speed_kt: Some(speed),
                track: None,
                last_contact_epoch_sec: Some(at.timestamp()),
                status: AircraftStatus::Landed,
                source: "opensky".to_string(),
                updated_at: at,
            };
            Ok(vec![
                snapshot("a1", "JIA5001", 0.0),
                snapshot("b2", "AAL45", 0.0),
            ])
        }
    }

    fn app(fail: bool) -> Router {
        let clock = ManualClock::new(DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap());
        let coordinator = Arc::new(CacheCoordinator::new(
            FixedSource {
                calls: AtomicUsize::new(0),
                fail,
            },
            Arc::new(MemoryStore::new()),
            AirportRegistry::with_defaults(),
            CachePolicy::default(),
            Arc::new(clock),
        ));
        let layouts = StaticLayoutStore::new().with_layout(
            "SAV",
            Layout {
                center: GATE,
                gates: vec![
                    GateRecord {
                        id: "A1".into(),
                        position: GATE,
                        notes: None,
                        preferred_aircraft_type: None,
                    },
                    GateRecord {
                        id: "A9".into(),
                        position: GeoPoint::new(32.14, -81.2),
                        notes: None,
                        preferred_aircraft_type: None,
                    },
                ],
                runways: vec![],
                taxi_graph: vec![],
            },
        );
        let state = AppState::new(coordinator, layouts, 50.0).with_request_driven_trails(true);
        router(Arc::new(state))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_nearby_returns_filtered_aircraft() {
        let (status, body) = get_json(app(false), "/aircraft/nearby/sav?radiusNm=25").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["airport"], "SAV");
        assert_eq!(body["radiusNm"], 25.0);
        assert_eq!(body["source"], "opensky_live");
        assert_eq!(body["stale"], false);
        assert_eq!(body["aircraft"].as_array().unwrap().len(), 1);
        assert_eq!(body["aircraft"][0]["callsign"], "JIA5001");
        assert!(body.get("debug").is_none());
    }

    #[tokio::test]
    async fn test_nearby_debug_detail() {
        let (status, body) = get_json(app(false), "/aircraft/nearby/SAV?debug=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["debug"]["cacheKey"], "SAV:50.0");
        assert!(body["debug"]["bbox"]["lamin"].is_number());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_stale_200() {
        let (status, body) = get_json(app(true), "/aircraft/nearby/SAV").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stale"], true);
        assert_eq!(body["source"], "upstream_timeout");
        assert!(body["aircraft"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_base_is_404() {
        let (status, body) = get_json(app(false), "/aircraft/nearby/XYZ").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown base 'XYZ'");

        let (status, _) = get_json(app(false), "/trails/XYZ").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_params_are_400() {
        let (status, _) = get_json(app(false), "/aircraft/nearby/SAV?radiusNm=far").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get_json(app(false), "/aircraft/nearby/SAV?radiusNm=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get_json(app(false), "/aircraft/nearby/SAV?radiusNm=0.04").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get_json(app(false), "/aircraft/nearby/SAV?force=perhaps").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_gates() {
        let (status, body) = get_json(app(false), "/gates/SAV").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["gates"][0]["gateId"], "A1");
        assert_eq!(body["gates"][0]["aircraft"]["icao24"], "a1");
        assert_eq!(body["gates"][1]["gateId"], "A9");
        assert!(body["gates"][1]["aircraft"].is_null());

        let (status, _) = get_json(app(false), "/gates/CLT").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bases_and_health() {
        let (status, body) = get_json(app(false), "/bases").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body
            .as_array()
            .unwrap()
            .iter()
            .any(|b| b["code"] == "SAV" && b["icaoCode"] == "KSAV"));

        let (status, body) = get_json(app(false), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["inFlight"], 0);
    }

    #[tokio::test]
    async fn test_trails_endpoint() {
        let (status, body) = get_json(app(false), "/trails/sav").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["airport"], "SAV");
        assert!(body["trails"].as_object().unwrap().is_empty());
    }
}
