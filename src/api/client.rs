use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::geo::LatLon;

use super::types::*;

const USER_AGENT: &str = concat!("seachart/", env!("CARGO_PKG_VERSION"));

/// Failure body the backend sends with non-2xx statuses
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Map a failed response to the backend's own message when it sent one
fn status_error(status: reqwest::StatusCode, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(message) }) if !message.is_empty() => ApiError::Backend(message),
        _ => ApiError::HttpStatus(status),
    }
}

/// Routing/monitoring backend client
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        // Url::join drops the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path (`api/route`) against the base URL
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            debug!(%status, "Request failed");
            return Err(status_error(status, &body));
        }
        // Parse via bytes so malformed bodies surface as Json errors
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Make a GET request and parse JSON response
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::parse(response).await
    }

    /// Make a POST request with a JSON body and parse JSON response
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        Self::parse(response).await
    }

    #[instrument(skip(self))]
    pub async fn route(
        &self,
        origin_port: &str,
        dest_port: &str,
    ) -> Result<RouteResponse, ApiError> {
        let request = RouteRequest {
            origin_port: origin_port.to_string(),
            dest_port: dest_port.to_string(),
        };
        let response: RouteResponse = self.post_json("api/route", &request).await?;
        if let Some(error) = response.error {
            return Err(ApiError::Backend(error));
        }
        debug!(
            points = response.route.as_ref().map_or(0, |r| r.coordinates.len()),
            "Fetched route"
        );
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn disaster_collisions(&self, disaster_id: &str) -> Result<Vec<Collision>, ApiError> {
        let path = format!("api/collisions/{}", urlencoding::encode(disaster_id));
        let values: Vec<serde_json::Value> = self.get_json(&path).await?;
        let collisions: Vec<Collision> = parse_items(values);
        debug!(count = collisions.len(), disaster_id, "Fetched disaster collisions");
        Ok(collisions)
    }

    #[instrument(skip(self, vessels), fields(vessels = vessels.len()))]
    pub async fn detect_collisions(
        &self,
        vessels: &[VesselReport],
    ) -> Result<Vec<Collision>, ApiError> {
        let request = DetectCollisionsRequest {
            vessels: vessels.to_vec(),
        };
        let values: Vec<serde_json::Value> =
            self.post_json("api/detect_collisions", &request).await?;
        let collisions: Vec<Collision> = parse_items(values);
        debug!(count = collisions.len(), "Detected collisions");
        Ok(collisions)
    }

    #[instrument(skip(self))]
    pub async fn weather(&self, at: LatLon) -> Result<Weather, ApiError> {
        let path = format!("api/weather?lat={}&lon={}", at.lat, at.lon);
        let weather: Weather = self.get_json(&path).await?;
        if let Some(error) = weather.error {
            return Err(ApiError::Backend(error));
        }
        Ok(weather)
    }

    #[instrument(skip(self, chokepoints), fields(chokepoints = chokepoints.len()))]
    pub async fn chokepoint_ships(
        &self,
        chokepoints: &[Chokepoint],
    ) -> Result<ChokepointShipsResponse, ApiError> {
        let request = ChokepointShipsRequest { chokepoints };
        self.post_json("api/chokepoint_ships", &request).await
    }

    #[instrument(skip(self))]
    pub async fn vessels_in_area(
        &self,
        area: &VesselArea,
        limit: u32,
    ) -> Result<VesselsResponse, ApiError> {
        let (path, request) = match area {
            VesselArea::Region(name) => (
                "api/vessels_in_area",
                VesselAreaRequest {
                    limit,
                    ocean_region: Some(name.clone()),
                    bounds: None,
                },
            ),
            VesselArea::Viewport(bounds) => (
                "api/vessels_in_area",
                VesselAreaRequest {
                    limit,
                    ocean_region: None,
                    bounds: Some(*bounds),
                },
            ),
            VesselArea::Custom(bounds) => (
                "api/vessels_in_custom_bbox",
                VesselAreaRequest {
                    limit,
                    ocean_region: None,
                    bounds: Some(*bounds),
                },
            ),
        };

        let response: VesselsResponse = self.post_json(path, &request).await?;
        if let Some(error) = response.error.clone().filter(|_| !response.success) {
            return Err(ApiError::Backend(error));
        }
        debug!(count = response.vessels.len(), "Fetched vessels");
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn disasters_in_area(
        &self,
        area: AreaBounds,
    ) -> Result<DisastersInAreaResponse, ApiError> {
        let response: DisastersInAreaResponse =
            self.post_json("api/disasters_in_area", &area).await?;
        if let Some(error) = response.error.clone().filter(|_| !response.success) {
            return Err(ApiError::Backend(error));
        }
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn eca_mpa_in_area(
        &self,
        area: AreaBounds,
    ) -> Result<EcaMpaInAreaResponse, ApiError> {
        let response: EcaMpaInAreaResponse = self.post_json("api/eca_mpa_in_area", &area).await?;
        if let Some(error) = response.error.clone().filter(|_| !response.success) {
            return Err(ApiError::Backend(error));
        }
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn water_bodies(&self) -> Result<Vec<String>, ApiError> {
        self.get_json("api/water_bodies").await
    }

    #[instrument(skip(self))]
    pub async fn countries(&self, water_body: &str) -> Result<Vec<String>, ApiError> {
        let path = format!("api/countries/{}", urlencoding::encode(water_body));
        self.get_json(&path).await
    }

    #[instrument(skip(self))]
    pub async fn ports(
        &self,
        water_body: &str,
        country: &str,
    ) -> Result<Vec<PortSummary>, ApiError> {
        let path = format!(
            "api/ports/{}/{}",
            urlencoding::encode(water_body),
            urlencoding::encode(country)
        );
        self.get_json(&path).await
    }

    #[instrument(skip(self))]
    pub async fn ocean_regions(&self) -> Result<Vec<OceanRegion>, ApiError> {
        self.get_json("api/ocean_regions").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client =
            ApiClient::new("http://localhost:5000/maritime", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/maritime/");
        assert_eq!(
            client.endpoint("api/route").unwrap().as_str(),
            "http://localhost:5000/maritime/api/route"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ApiClient::new("http://127.0.0.1:5000", Duration::from_secs(5)).unwrap();
        let path = format!("api/countries/{}", urlencoding::encode("South China Sea"));
        assert_eq!(
            client.endpoint(&path).unwrap().as_str(),
            "http://127.0.0.1:5000/api/countries/South%20China%20Sea"
        );
    }

    #[test]
    fn test_status_error_prefers_backend_message() {
        let err = status_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error": "Failed to calculate route"}"#,
        );
        assert!(matches!(err, ApiError::Backend(ref m) if m == "Failed to calculate route"));

        let err = status_error(reqwest::StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert!(matches!(err, ApiError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY)));

        let err = status_error(reqwest::StatusCode::NOT_FOUND, br#"{"detail": "nope"}"#);
        assert!(matches!(err, ApiError::HttpStatus(reqwest::StatusCode::NOT_FOUND)));
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(5)),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:ops@example.com", Duration::from_secs(5)),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
