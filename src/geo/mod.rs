mod bounds;
mod normalize;

pub use bounds::Bounds;
pub use normalize::{normalize, normalize_all, wrap_lon};

use serde::{Deserialize, Serialize};

/// WGS84 point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from a GeoJSON position, which is ordered `[lon, lat]`
    pub fn from_geojson(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] => Some(Self::new(*lat, *lon)),
            _ => None,
        }
    }
}

impl From<[f64; 2]> for LatLon {
    /// Route geometry pairs are `[lat, lon]`
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}
