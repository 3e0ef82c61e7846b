//! Geodesic primitives for airport-scale calculations.
//!
//! Distances use the haversine formula on a spherical Earth. Gate matching
//! works with tolerances of tens of meters, so a flat-earth approximation is
//! not good enough even at airport scale.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Kilometers per nautical mile.
pub const KM_PER_NM: f64 = 1.852;

/// Approximate kilometers per degree of latitude.
const KM_PER_DEG_LAT: f64 = 111.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Latitude/longitude rectangle used to scope an upstream query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lamin: f64,
    pub lomin: f64,
    pub lamax: f64,
    pub lomax: f64,
}

impl BoundingBox {
    /// Returns true if the point lies inside the box (edges inclusive).
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.lamin
            && point.lat <= self.lamax
            && point.lon >= self.lomin
            && point.lon <= self.lomax
    }

    /// Query-string pairs in the order the states endpoint documents them.
    pub fn to_query(&self) -> [(&'static str, String); 4] {
        [
            ("lamin", format!("{:.4}", self.lamin)),
            ("lomin", format!("{:.4}", self.lomin)),
            ("lamax", format!("{:.4}", self.lamax)),
            ("lomax", format!("{:.4}", self.lomax)),
        ]
    }
}

/// Great-circle distance between two points, in meters.
///
/// # Example
///
/// ```
/// use gatewatch::geo::{haversine_meters, GeoPoint};
///
/// let a = GeoPoint::new(0.0, 0.0);
/// let b = GeoPoint::new(1.0, 0.0);
/// let d = haversine_meters(a, b);
/// assert!((d - 111_195.0).abs() < 50.0);
/// ```
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Convert a nautical-mile radius around `center` into a lat/lon box.
///
/// Uses `dLat = km / 111` and `dLon = km / (111 * cos(lat))`. The longitude
/// span blows up as latitude approaches ±90°; airports are not polar, so this
/// is left as a known limitation.
pub fn bounding_box_from_center(center: GeoPoint, radius_nm: f64) -> BoundingBox {
    let km = radius_nm * KM_PER_NM;
    let d_lat = km / KM_PER_DEG_LAT;
    let d_lon = km / (KM_PER_DEG_LAT * center.lat.to_radians().cos());

    BoundingBox {
        lamin: center.lat - d_lat,
        lomin: center.lon - d_lon,
        lamax: center.lat + d_lat,
        lomax: center.lon + d_lon,
    }
}
