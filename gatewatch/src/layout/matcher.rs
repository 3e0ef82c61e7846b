//! Gate occupancy and taxi-node association.
//!
//! Each gate scans the aircraft list in order and claims the first aircraft
//! that is both close and nearly stopped. Aircraft are not removed from the
//! pool once claimed, so two gates within range of the same aircraft can
//! both report it. This is a greedy pass, not an assignment problem.

use std::collections::HashSet;

use serde::Serialize;

use super::{GateRecord, Layout, TaxiNode};
use crate::aircraft::AircraftSnapshot;
use crate::geo::{haversine_meters, GeoPoint};

/// An aircraft must be strictly closer than this to occupy a gate.
pub const GATE_MATCH_METERS: f64 = 40.0;

/// An aircraft must be strictly slower than this to occupy a gate.
pub const GATE_MAX_KTS: f64 = 5.0;

/// Furthest a taxi node may be from an aircraft to be associated with it.
pub const TAXI_NODE_MAX_METERS: f64 = 60.0;

/// Occupancy of one gate. `aircraft` is `None` when the gate is free.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateOccupancy {
    pub gate_id: String,
    pub aircraft: Option<AircraftSnapshot>,
}

impl GateOccupancy {
    pub fn is_occupied(&self) -> bool {
        self.aircraft.is_some()
    }
}

/// An on-ground aircraft away from any gate, pinned to its nearest taxi node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxiAssignment {
    pub icao24: String,
    pub callsign: Option<String>,
    pub node_id: String,
    pub distance_m: f64,
}

/// Gate occupancy plus taxi associations for one poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateBoard {
    pub gates: Vec<GateOccupancy>,
    pub taxi: Vec<TaxiAssignment>,
}

fn occupies(aircraft: &AircraftSnapshot, gate: &GateRecord) -> bool {
    // Missing speed is treated as moving.
    let Some(speed) = aircraft.ground_speed_kt else {
        return false;
    };
    speed < GATE_MAX_KTS && haversine_meters(aircraft.position(), gate.position) < GATE_MATCH_METERS
}

/// One result per gate, in gate order.
pub fn match_aircraft_to_gates(
    aircraft: &[AircraftSnapshot],
    gates: &[GateRecord],
) -> Vec<GateOccupancy> {
    gates
        .iter()
        .map(|gate| GateOccupancy {
            gate_id: gate.id.clone(),
            aircraft: aircraft.iter().find(|a| occupies(a, gate)).cloned(),
        })
        .collect()
}

/// Closest node within `max_meters` of `position`, with its distance.
pub fn nearest_taxi_node(
    position: GeoPoint,
    nodes: &[TaxiNode],
    max_meters: f64,
) -> Option<(&TaxiNode, f64)> {
    nodes
        .iter()
        .map(|node| (node, haversine_meters(position, node.position())))
        .filter(|(_, distance)| *distance <= max_meters)
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Associate on-ground aircraft that are not at a gate with a taxi node.
pub fn assign_taxi_nodes(aircraft: &[AircraftSnapshot], layout: &Layout) -> Vec<TaxiAssignment> {
    let occupancy = match_aircraft_to_gates(aircraft, &layout.gates);
    assign_with_occupancy(aircraft, layout, &occupancy)
}

fn assign_with_occupancy(
    aircraft: &[AircraftSnapshot],
    layout: &Layout,
    occupancy: &[GateOccupancy],
) -> Vec<TaxiAssignment> {
    let at_gate: HashSet<&str> = occupancy
        .iter()
        .filter_map(|o| o.aircraft.as_ref())
        .map(|a| a.icao24.as_str())
        .collect();

    aircraft
        .iter()
        .filter(|a| a.on_ground && !at_gate.contains(a.icao24.as_str()))
        .filter_map(|a| {
            let (node, distance_m) =
                nearest_taxi_node(a.position(), &layout.taxi_graph, TAXI_NODE_MAX_METERS)?;
            Some(TaxiAssignment {
                icao24: a.icao24.clone(),
                callsign: a.callsign.clone(),
                node_id: node.id.clone(),
                distance_m,
            })
        })
        .collect()
}

/// Gate occupancy and taxi associations in one pass.
pub fn build_gate_board(aircraft: &[AircraftSnapshot], layout: &Layout) -> GateBoard {
    let gates = match_aircraft_to_gates(aircraft, &layout.gates);
    let taxi = assign_with_occupancy(aircraft, layout, &gates);
    GateBoard { gates, taxi }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::AircraftStatus;
    use chrono::Utc;

    const GATE: GeoPoint = GeoPoint {
        lat: 32.1280,
        lon: -81.2010,
    };

    /// Roughly `meters` north of `from`.
    fn north_of(from: GeoPoint, meters: f64) -> GeoPoint {
        GeoPoint::new(from.lat + meters / 111_195.0, from.lon)
    }

    fn aircraft(icao24: &str, at: GeoPoint, speed: Option<f64>, on_ground: bool) -> AircraftSnapshot {
        AircraftSnapshot {
            icao24: icao24.to_string(),
            callsign: Some(format!("JIA{icao24}")),
            lat: at.lat,
            lon: at.lon,
            on_ground,
            ground_speed_kt: speed,
            track: None,
            last_contact_epoch_sec: None,
            status: AircraftStatus::Landed,
            source: "opensky".to_string(),
            updated_at: Utc::now(),
        }
    }

    fn gate(id: &str, at: GeoPoint) -> GateRecord {
        GateRecord {
            id: id.to_string(),
            position: at,
            notes: None,
            preferred_aircraft_type: None,
        }
    }

    fn node(id: &str, at: GeoPoint) -> TaxiNode {
        TaxiNode {
            id: id.to_string(),
            lat: at.lat,
            lon: at.lon,
            neighbors: vec![],
        }
    }

    #[test]
    fn test_aircraft_at_gate_and_stopped_matches() {
        let result =
            match_aircraft_to_gates(&[aircraft("1", GATE, Some(0.0), true)], &[gate("A1", GATE)]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].gate_id, "A1");
        assert_eq!(result[0].aircraft.as_ref().unwrap().icao24, "1");
    }

    #[test]
    fn test_aircraft_100m_away_does_not_match() {
        let far = north_of(GATE, 100.0);
        let result =
            match_aircraft_to_gates(&[aircraft("1", far, Some(0.0), true)], &[gate("A1", GATE)]);
        assert!(!result[0].is_occupied());
    }

    #[test]
    fn test_moving_aircraft_does_not_match() {
        let near = north_of(GATE, 10.0);
        let result =
            match_aircraft_to_gates(&[aircraft("1", near, Some(20.0), true)], &[gate("A1", GATE)]);
        assert!(!result[0].is_occupied());
    }

    #[test]
    fn test_missing_speed_never_matches() {
        let result =
            match_aircraft_to_gates(&[aircraft("1", GATE, None, true)], &[gate("A1", GATE)]);
        assert!(!result[0].is_occupied());
    }

    #[test]
    fn test_thresholds_are_strict() {
        let result = match_aircraft_to_gates(
            &[aircraft("1", GATE, Some(GATE_MAX_KTS), true)],
            &[gate("A1", GATE)],
        );
        assert!(!result[0].is_occupied());
    }

    #[test]
    fn test_first_aircraft_in_list_wins_and_gate_order_kept() {
        let gates = [gate("B2", north_of(GATE, 500.0)), gate("A1", GATE)];
        let list = [
            aircraft("1", north_of(GATE, 30.0), Some(1.0), true),
            aircraft("2", GATE, Some(0.0), true),
        ];
        let result = match_aircraft_to_gates(&list, &gates);

        assert_eq!(result[0].gate_id, "B2");
        assert!(!result[0].is_occupied());
        assert_eq!(result[1].gate_id, "A1");
        assert_eq!(result[1].aircraft.as_ref().unwrap().icao24, "1");
    }

    #[test]
    fn test_aircraft_can_be_reported_by_two_close_gates() {
        let gates = [gate("A1", GATE), gate("A2", north_of(GATE, 20.0))];
        let list = [aircraft("1", north_of(GATE, 10.0), Some(0.0), true)];
        let result = match_aircraft_to_gates(&list, &gates);
        assert!(result.iter().all(GateOccupancy::is_occupied));
    }

    #[test]
    fn test_nearest_taxi_node() {
        let nodes = [node("T1", north_of(GATE, 50.0)), node("T2", north_of(GATE, 20.0))];
        let (found, distance) = nearest_taxi_node(GATE, &nodes, TAXI_NODE_MAX_METERS).unwrap();
        assert_eq!(found.id, "T2");
        assert!((distance - 20.0).abs() < 1.0);

        assert!(nearest_taxi_node(north_of(GATE, 500.0), &nodes, TAXI_NODE_MAX_METERS).is_none());
        assert!(nearest_taxi_node(GATE, &[], TAXI_NODE_MAX_METERS).is_none());
    }

    #[test]
    fn test_taxi_assignment_skips_gate_and_airborne_aircraft() {
        let taxiway = north_of(GATE, 300.0);
        let layout = Layout {
            center: GATE,
            gates: vec![gate("A1", GATE)],
            runways: vec![],
            taxi_graph: vec![node("T1", GATE), node("T9", taxiway)],
        };
        let list = [
            aircraft("parked", GATE, Some(0.0), true),
            aircraft("taxiing", north_of(taxiway, 10.0), Some(12.0), true),
            aircraft("airborne", taxiway, Some(140.0), false),
        ];

        let board = build_gate_board(&list, &layout);
        assert_eq!(board.gates[0].aircraft.as_ref().unwrap().icao24, "parked");
        assert_eq!(board.taxi.len(), 1);
        assert_eq!(board.taxi[0].icao24, "taxiing");
        assert_eq!(board.taxi[0].node_id, "T9");

        assert_eq!(assign_taxi_nodes(&list, &layout), board.taxi);
    }
}
