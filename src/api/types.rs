use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::geo::{Bounds, LatLon};

/// Accept identifiers the backend sends either as strings or numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Keep the entries of a JSON list that parse as `T`; one bad record
/// never costs the rest of the list
pub fn parse_items<T: DeserializeOwned>(values: Vec<serde_json::Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(
                    error = %e,
                    record = std::any::type_name::<T>(),
                    "Skipping malformed record"
                );
                None
            }
        })
        .collect()
}

/// List field parsed item by item; `null` reads as empty
fn lenient<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(parse_items(values.unwrap_or_default()))
}

/// JS truthiness on coordinates: absent and zero both mean "no position"
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

/// Request body for `POST /api/route`
#[derive(Debug, Clone, Serialize)]
pub struct RouteRequest {
    pub origin_port: String,
    pub dest_port: String,
}

/// Response of `POST /api/route`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteResponse {
    pub error: Option<String>,
    pub route: Option<RouteInfo>,
    pub origin: Option<PortInfo>,
    pub destination: Option<PortInfo>,
    /// Ships per disaster, keyed by GDACS id
    #[serde(default)]
    pub ships: Option<BTreeMap<String, DisasterShips>>,
    pub eca_mpa_data: Option<FeatureCollection>,
    pub piracy: Option<PiracyData>,
    #[serde(default)]
    pub enable_collision_check: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteInfo {
    /// `[lat, lon]` pairs
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Vec<[f64; 2]>,
    pub length: Option<f64>,
    pub units: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub disasters: Vec<Disaster>,
    #[serde(default, deserialize_with = "lenient")]
    pub chokepoints: Vec<Chokepoint>,
}

impl RouteInfo {
    pub fn path(&self) -> Vec<LatLon> {
        self.coordinates.iter().copied().map(LatLon::from).collect()
    }
}

/// Origin or destination port details
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortInfo {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub port_code: Option<String>,
    pub harbor_size: Option<String>,
    pub harbor_type: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub disasters: Vec<Disaster>,
    pub congestion: Option<Congestion>,
}

impl PortInfo {
    pub fn position(&self) -> Option<LatLon> {
        Some(LatLon::new(present(self.lat)?, present(self.lon)?))
    }

    pub fn display_code(&self) -> Option<&str> {
        self.port_code.as_deref().or(self.code.as_deref())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown port")
    }
}

/// Traffic around a port
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Congestion {
    #[serde(default)]
    pub congested: bool,
    pub ship_count: Option<u32>,
    pub radius_km: Option<f64>,
    pub threshold: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub ships: Vec<Ship>,
}

/// GDACS disaster event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Disaster {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub gdacs_id: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
    pub event_type: Option<String>,
    pub alert_level: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub bbox: Option<DisasterBbox>,
    pub is_current: Option<bool>,
}

impl Disaster {
    pub fn position(&self) -> Option<LatLon> {
        Some(LatLon::new(self.lat?, self.lon?))
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown disaster")
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DisasterBbox {
    pub lat_min: Option<f64>,
    pub lon_min: Option<f64>,
    pub lat_max: Option<f64>,
    pub lon_max: Option<f64>,
}

impl DisasterBbox {
    /// `(south_west, north_east)` when every edge is present
    pub fn corners(&self) -> Option<(LatLon, LatLon)> {
        Some((
            LatLon::new(present(self.lat_min)?, present(self.lon_min)?),
            LatLon::new(present(self.lat_max)?, present(self.lon_max)?),
        ))
    }
}

/// Ships found inside one disaster area
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisasterShips {
    pub disaster_info: Option<DisasterInfo>,
    #[serde(default, deserialize_with = "lenient")]
    pub ships: Vec<Ship>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisasterInfo {
    pub title: Option<String>,
    pub event_type: Option<String>,
    pub alert_level: Option<String>,
}

/// AIS vessel report
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    pub boat_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mmsi: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub imo: Option<String>,
    pub country: Option<String>,
    pub vessel_type: Option<String>,
    pub point: Option<ShipPoint>,
    pub destination_name: Option<String>,
    pub speed_kmh: Option<f64>,
    pub bearing_deg: Option<f64>,
    pub draught_meters: Option<f64>,
    pub length_meters: Option<f64>,
    pub width_meters: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ShipPoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Ship {
    pub fn position(&self) -> Option<LatLon> {
        let point = self.point?;
        Some(LatLon::new(present(point.latitude)?, present(point.longitude)?))
    }

    pub fn display_name(&self) -> &str {
        match self.boat_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Unknown vessel",
        }
    }

    /// Kinematic report for collision detection; needs position, speed and bearing
    pub fn vessel_report(&self) -> Option<VesselReport> {
        let position = self.position()?;
        Some(VesselReport {
            mmsi: self.mmsi.clone().unwrap_or_else(|| "Unknown".to_string()),
            name: self.display_name().to_string(),
            lat: position.lat,
            lon: position.lon,
            speed_kmh: self.speed_kmh?,
            bearing_deg: self.bearing_deg?,
        })
    }
}

/// Vessel entry of `POST /api/detect_collisions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselReport {
    pub mmsi: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub speed_kmh: f64,
    pub bearing_deg: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectCollisionsRequest {
    pub vessels: Vec<VesselReport>,
}

/// Closest-point-of-approach risk between two vessels
#[derive(Debug, Clone, Deserialize)]
pub struct Collision {
    pub vessel_a: CollisionVessel,
    pub vessel_b: CollisionVessel,
    pub cpa_km: f64,
    pub tcpa_minutes: f64,
    #[serde(default)]
    pub risk_level: String,
}

impl Collision {
    pub fn is_critical(&self) -> bool {
        self.risk_level.eq_ignore_ascii_case("CRITICAL")
    }

    pub fn cpa_nm(&self) -> f64 {
        self.cpa_km / 1.852
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollisionVessel {
    #[serde(default, deserialize_with = "string_or_number")]
    pub mmsi: Option<String>,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl CollisionVessel {
    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// Maritime chokepoint hit by the route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chokepoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChokepointShipsRequest<'a> {
    pub chokepoints: &'a [Chokepoint],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChokepointShipsResponse {
    /// Ships keyed by chokepoint name
    #[serde(default)]
    pub ships: BTreeMap<String, Vec<Ship>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PiracyData {
    #[serde(default, deserialize_with = "lenient")]
    pub incidents: Vec<PiracyIncident>,
    pub current_month_total: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PiracyIncident {
    pub date: Option<String>,
    pub incident_date: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub incident_number: Option<String>,
    pub sitrep: Option<String>,
    pub location_desc: Option<String>,
    pub incident_type: Option<String>,
}

impl PiracyIncident {
    pub fn position(&self) -> Option<LatLon> {
        Some(LatLon::new(present(self.lat)?, present(self.lon)?))
    }
}

/// GeoJSON feature collection of ECA/MPA zones
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default, deserialize_with = "lenient")]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: AreaProperties,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaProperties {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub area_type: Option<String>,
    pub description: Option<String>,
}

impl AreaProperties {
    /// Feature names arrive snake_cased
    pub fn clean_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(|n| n.replace('_', " ").trim().to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

impl Geometry {
    /// Outer rings as lat/lon, converted from GeoJSON `[lon, lat]` order.
    /// Geometries other than (multi)polygons yield nothing.
    pub fn outer_rings(&self) -> Vec<Vec<LatLon>> {
        match self.kind.as_str() {
            "Polygon" => serde_json::from_value::<Vec<Vec<Vec<f64>>>>(self.coordinates.clone())
                .map(|rings| rings.first().map(|r| ring(r)).into_iter().collect())
                .unwrap_or_default(),
            "MultiPolygon" => {
                serde_json::from_value::<Vec<Vec<Vec<Vec<f64>>>>>(self.coordinates.clone())
                    .map(|polygons| {
                        polygons
                            .iter()
                            .filter_map(|rings| rings.first().map(|r| ring(r)))
                            .collect()
                    })
                    .unwrap_or_default()
            }
            _ => Vec::new(),
        }
    }
}

fn ring(positions: &[Vec<f64>]) -> Vec<LatLon> {
    positions
        .iter()
        .filter_map(|p| LatLon::from_geojson(p))
        .collect()
}

/// Response of `GET /api/weather`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Weather {
    pub error: Option<String>,
    pub current: Option<CurrentWeather>,
    #[serde(default)]
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentWeather {
    pub temperature_2m: Option<f64>,
    pub wind_speed_10m: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastDay {
    pub date: Option<String>,
    pub day_name: Option<String>,
    pub avg_temp: Option<f64>,
    pub avg_wind: Option<f64>,
}

/// Corner form of a query rectangle used by the area endpoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaBounds {
    pub sw_lat: f64,
    pub sw_lon: f64,
    pub ne_lat: f64,
    pub ne_lon: f64,
}

impl AreaBounds {
    pub fn to_bounds(self) -> Bounds {
        Bounds::new(self.sw_lat, self.sw_lon, self.ne_lat, self.ne_lon)
    }
}

impl From<Bounds> for AreaBounds {
    fn from(b: Bounds) -> Self {
        Self {
            sw_lat: b.south,
            sw_lon: b.west,
            ne_lat: b.north,
            ne_lon: b.east,
        }
    }
}

/// Which vessels to load for area tracking
#[derive(Debug, Clone, PartialEq)]
pub enum VesselArea {
    /// Named ocean region from `/api/ocean_regions`
    Region(String),
    /// Viewport rectangle
    Viewport(AreaBounds),
    /// User-drawn rectangle (`/api/vessels_in_custom_bbox`)
    Custom(AreaBounds),
}

#[derive(Debug, Clone, Serialize)]
pub struct VesselAreaRequest {
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocean_region: Option<String>,
    #[serde(flatten)]
    pub bounds: Option<AreaBounds>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VesselsResponse {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub vessels: Vec<Ship>,
    pub bounds: Option<AreaBounds>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisastersInAreaResponse {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub disasters: Vec<Disaster>,
    pub ships: Option<BTreeMap<String, DisasterShips>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EcaMpaInAreaResponse {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    pub eca_mpa: Option<FeatureCollection>,
}

/// Port entry of `/api/ports/:waterBody/:country`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PortSummary {
    #[serde(default, deserialize_with = "string_or_number")]
    pub port_code: Option<String>,
    pub port_name: Option<String>,
}

/// Entry of `/api/ocean_regions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OceanRegion {
    pub name: String,
    #[serde(rename = "min_Y")]
    pub min_lat: f64,
    #[serde(rename = "min_X")]
    pub min_lon: f64,
    #[serde(rename = "max_Y")]
    pub max_lat: f64,
    #[serde(rename = "max_X")]
    pub max_lon: f64,
}

impl OceanRegion {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.min_lat, self.min_lon, self.max_lat, self.max_lon)
    }
}
