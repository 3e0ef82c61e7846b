//! Airport layouts: gates, runways and the taxi graph.
//!
//! Layouts are owned by an external editor and consumed read-only here. A
//! [`LayoutStore`] hands out one [`Layout`] per base code.

mod matcher;
mod store;

use std::future::Future;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::GeoPoint;

pub use matcher::{
    assign_taxi_nodes, build_gate_board, match_aircraft_to_gates, nearest_taxi_node, GateBoard,
    GateOccupancy, TaxiAssignment, GATE_MATCH_METERS, GATE_MAX_KTS, TAXI_NODE_MAX_METERS,
};
pub use store::{FileLayoutStore, StaticLayoutStore};

/// Aircraft type a gate is normally used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AircraftType {
    Crj200,
    Crj700,
    Crj900,
    #[serde(other)]
    Other,
}

/// A parking position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateRecord {
    pub id: String,
    pub position: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_aircraft_type: Option<AircraftType>,
}

/// A runway as a polyline of centerline points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runway {
    pub id: String,
    #[serde(default)]
    pub points: Vec<GeoPoint>,
}

/// A taxi graph node with its adjacent node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxiNode {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub neighbors: Vec<String>,
}

impl TaxiNode {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Layout blob for one base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub center: GeoPoint,
    #[serde(default)]
    pub gates: Vec<GateRecord>,
    #[serde(default)]
    pub runways: Vec<Runway>,
    #[serde(default)]
    pub taxi_graph: Vec<TaxiNode>,
}

impl Layout {
    /// Layout with no features, centered on `center`.
    pub fn empty(center: GeoPoint) -> Self {
        Self {
            center,
            gates: Vec::new(),
            runways: Vec::new(),
            taxi_graph: Vec::new(),
        }
    }
}

/// Errors reading a layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("No layout for base '{0}'")]
    NotFound(String),

    #[error("Failed to read layout {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid layout {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only access to per-base layouts.
pub trait LayoutStore: Send + Sync {
    fn load(&self, base: &str) -> impl Future<Output = Result<Layout, LayoutError>> + Send;
}
