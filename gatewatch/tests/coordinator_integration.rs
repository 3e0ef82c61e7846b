//! End-to-end tests for the aircraft cache.
//!
//! These drive a real `TelemetryClient` over a scripted transport, so every
//! response passes through token exchange, state-vector normalization, both
//! cache tiers and the fleet filter.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gatewatch::aircraft::AircraftStatus;
use gatewatch::airport::AirportRegistry;
use gatewatch::cache::{CacheCoordinator, CachePolicy, FetchSource};
use gatewatch::opensky::{
    ClientCredentials, HttpResponse, HttpTransport, OpenSkyConfig, TelemetryClient,
    TransportError,
};
use gatewatch::store::MemoryStore;
use gatewatch::time::{Clock, ManualClock};
use parking_lot::Mutex;

const T0: i64 = 1_700_000_000;

/// One airborne fleet aircraft and one non-fleet aircraft near SAV.
fn states_body(epoch: i64) -> String {
    format!(
        r#"{{"time":{epoch},"states":[
            ["a0b1c2","JIA4821 ","United States",{epoch},{epoch},-81.10,32.20,1500.0,false,120.0,45.0,2.5,null,1600.0,null,false,0,0],
            ["ffee00","DAL1100 ","United States",{epoch},{epoch},-81.30,32.00,3000.0,false,200.0,180.0,0.0,null,3100.0,null,false,0,0]
        ]}}"#
    )
}

/// Transport that issues tokens freely and answers states requests from a
/// script. An exhausted script repeats a successful body.
struct ScriptedTransport {
    script: Mutex<VecDeque<u16>>,
    states_calls: Mutex<usize>,
    delay: Duration,
}

impl ScriptedTransport {
    fn new(script: Vec<u16>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            states_calls: Mutex::new(0),
            delay,
        })
    }

    fn states_calls(&self) -> usize {
        *self.states_calls.lock()
    }
}

struct SharedTransport(Arc<ScriptedTransport>);

impl HttpTransport for SharedTransport {
    async fn get_with_bearer(
        &self,
        _url: &str,
        _query: &[(&str, String)],
        _bearer_token: &str,
        _timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        *self.0.states_calls.lock() += 1;
        if !self.0.delay.is_zero() {
            tokio::time::sleep(self.0.delay).await;
        }

        let status = self.0.script.lock().pop_front().unwrap_or(200);
        let body = if status == 200 {
            states_body(T0)
        } else {
            "Service Unavailable".to_string()
        };

        Ok(HttpResponse {
            status,
            body: body.into_bytes(),
        })
    }

    async fn post_form(
        &self,
        _url: &str,
        _form: &[(&str, &str)],
        _timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse {
            status: 200,
            body: br#"{"access_token":"integration-token","expires_in":1800}"#.to_vec(),
        })
    }
}

type Coordinator = CacheCoordinator<TelemetryClient<SharedTransport>, MemoryStore>;

fn start() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(T0, 0).unwrap()
}

fn coordinator(
    transport: &Arc<ScriptedTransport>,
    store: Arc<MemoryStore>,
    clock: &ManualClock,
) -> Coordinator {
    let clock: Arc<dyn Clock> = Arc::new(clock.clone());
    let config = OpenSkyConfig {
        credentials: Some(ClientCredentials {
            client_id: "integration".into(),
            client_secret: "secret".into(),
        }),
        ..Default::default()
    };
    let client = TelemetryClient::new(
        SharedTransport(Arc::clone(transport)),
        config,
        Arc::clone(&clock),
    );

    CacheCoordinator::new(
        client,
        store,
        AirportRegistry::with_defaults(),
        CachePolicy::default(),
        clock,
    )
}

#[tokio::test]
async fn test_live_fetch_normalizes_and_filters() {
    let transport = ScriptedTransport::new(vec![], Duration::ZERO);
    let clock = ManualClock::new(start());
    let coordinator = coordinator(&transport, Arc::new(MemoryStore::new()), &clock);

    let response = coordinator.get_aircraft("SAV", 500.0, false).await.unwrap();

    assert_eq!(response.source, FetchSource::OpenskyLive);
    assert!(!response.stale);
    assert_eq!(response.radius_nm, 500.0);
    assert_eq!(response.aircraft.len(), 1);

    let aircraft = &response.aircraft[0];
    assert_eq!(aircraft.icao24, "a0b1c2");
    assert_eq!(aircraft.callsign.as_deref(), Some("JIA4821"));
    assert_eq!(aircraft.status, AircraftStatus::Active);
    let knots = aircraft.ground_speed_kt.unwrap();
    assert!((knots - 233.3).abs() < 0.1, "got {knots}");
}

#[tokio::test]
async fn test_fresh_window_skips_upstream() {
    let transport = ScriptedTransport::new(vec![], Duration::ZERO);
    let clock = ManualClock::new(start());
    let store = Arc::new(MemoryStore::new());
    let first = coordinator(&transport, Arc::clone(&store), &clock);

    first.get_aircraft("SAV", 50.0, false).await.unwrap();
    clock.advance(Duration::from_secs(2));
    let again = first.get_aircraft("SAV", 50.0, false).await.unwrap();
    assert_eq!(again.source, FetchSource::CacheFreshMem);

    // A second instance sharing the durable store sees the same entry.
    let second = coordinator(&transport, Arc::clone(&store), &clock);
    let shared = second.get_aircraft("sav", 50.0, false).await.unwrap();
    assert_eq!(shared.source, FetchSource::CacheFresh);
    assert_eq!(shared.aircraft, again.aircraft);

    assert_eq!(transport.states_calls(), 1);
}

#[tokio::test]
async fn test_cooldown_suppresses_then_resumes() {
    let transport = ScriptedTransport::new(vec![200, 503], Duration::ZERO);
    let clock = ManualClock::new(start());
    let coordinator = coordinator(&transport, Arc::new(MemoryStore::new()), &clock);

    coordinator.get_aircraft("SAV", 50.0, false).await.unwrap();

    // Past both fresh windows, the upstream fails.
    clock.advance(Duration::from_secs(7));
    let failed = coordinator.get_aircraft("SAV", 50.0, false).await.unwrap();
    assert_eq!(failed.source, FetchSource::UpstreamError);
    assert!(failed.stale);
    assert_eq!(failed.aircraft.len(), 1);
    assert_eq!(failed.updated_at, start());
    assert_eq!(transport.states_calls(), 2);

    // Inside the cooldown nothing reaches upstream.
    clock.advance(Duration::from_secs(10));
    let cooling = coordinator.get_aircraft("SAV", 50.0, false).await.unwrap();
    assert_eq!(cooling.source, FetchSource::CacheCooldown);
    assert!(cooling.stale);
    assert_eq!(cooling.aircraft.len(), 1);
    assert_eq!(transport.states_calls(), 2);

    // After it expires the next request goes live again.
    clock.advance(Duration::from_secs(21));
    let resumed = coordinator.get_aircraft("SAV", 50.0, false).await.unwrap();
    assert_eq!(resumed.source, FetchSource::OpenskyLive);
    assert!(!resumed.stale);
    assert_eq!(transport.states_calls(), 3);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_fetch() {
    let transport = ScriptedTransport::new(vec![], Duration::from_millis(100));
    let clock = ManualClock::new(start());
    let coordinator = Arc::new(coordinator(&transport, Arc::new(MemoryStore::new()), &clock));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let coordinator = Arc::clone(&coordinator);
        handles.push(tokio::spawn(async move {
            coordinator.get_aircraft("SAV", 50.0, false).await
        }));
    }

    let mut payloads = Vec::new();
    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.source, FetchSource::OpenskyLive);
        payloads.push(serde_json::to_string(&response).unwrap());
    }

    assert_eq!(transport.states_calls(), 1);
    assert!(payloads.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(coordinator.in_flight_count(), 0);
    assert_eq!(coordinator.stats().snapshot().coalesced_waits, 7);
}
