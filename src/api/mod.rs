mod cache;
mod client;
mod types;

pub use cache::{default_cache_dir, CatalogCache};
pub use client::ApiClient;
pub use types::*;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use crate::error::ApiError;
use crate::geo::LatLon;

/// Backend operations the map controller depends on
#[async_trait]
pub trait Backend: Send + Sync {
    async fn route(&self, origin_port: &str, dest_port: &str) -> Result<RouteResponse, ApiError>;

    async fn disaster_collisions(&self, disaster_id: &str) -> Result<Vec<Collision>, ApiError>;

    async fn detect_collisions(
        &self,
        vessels: &[VesselReport],
    ) -> Result<Vec<Collision>, ApiError>;

    async fn chokepoint_ships(
        &self,
        chokepoints: &[Chokepoint],
    ) -> Result<ChokepointShipsResponse, ApiError>;

    async fn weather(&self, at: LatLon) -> Result<Weather, ApiError>;

    async fn vessels_in_area(
        &self,
        area: &VesselArea,
        limit: u32,
    ) -> Result<VesselsResponse, ApiError>;

    async fn disasters_in_area(
        &self,
        area: AreaBounds,
    ) -> Result<DisastersInAreaResponse, ApiError>;

    async fn eca_mpa_in_area(&self, area: AreaBounds) -> Result<EcaMpaInAreaResponse, ApiError>;
}

/// Backend client with cached catalog lookups
pub struct ApiService {
    client: ApiClient,
    cache: Arc<CatalogCache>,
}

impl ApiService {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        cache_dir: Option<PathBuf>,
        catalog_ttl: Duration,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: ApiClient::new(base_url, timeout)?,
            cache: Arc::new(CatalogCache::new(cache_dir, catalog_ttl)),
        })
    }

    /// Water bodies with ports (with caching)
    #[instrument(skip(self))]
    pub async fn water_bodies(&self) -> Result<Vec<String>, ApiError> {
        if let Some(cached) = self.cache.get("water_bodies") {
            return Ok(cached);
        }
        let water_bodies = self.client.water_bodies().await?;
        self.cache.set("water_bodies", &water_bodies);
        Ok(water_bodies)
    }

    /// Country codes bordering a water body (with caching)
    #[instrument(skip(self))]
    pub async fn countries(&self, water_body: &str) -> Result<Vec<String>, ApiError> {
        let key = format!("countries/{water_body}");
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }
        let countries = self.client.countries(water_body).await?;
        self.cache.set(&key, &countries);
        Ok(countries)
    }

    /// Ports for a water body and country (not cached; the list is small)
    #[instrument(skip(self))]
    pub async fn ports(
        &self,
        water_body: &str,
        country: &str,
    ) -> Result<Vec<PortSummary>, ApiError> {
        self.client.ports(water_body, country).await
    }

    /// Named ocean regions for vessel tracking (with caching)
    #[instrument(skip(self))]
    pub async fn ocean_regions(&self) -> Result<Vec<OceanRegion>, ApiError> {
        if let Some(cached) = self.cache.get("ocean_regions") {
            return Ok(cached);
        }
        let regions = self.client.ocean_regions().await?;
        self.cache.set("ocean_regions", &regions);
        Ok(regions)
    }
}

#[async_trait]
impl Backend for ApiService {
    async fn route(&self, origin_port: &str, dest_port: &str) -> Result<RouteResponse, ApiError> {
        self.client.route(origin_port, dest_port).await
    }

    async fn disaster_collisions(&self, disaster_id: &str) -> Result<Vec<Collision>, ApiError> {
        self.client.disaster_collisions(disaster_id).await
    }

    async fn detect_collisions(
        &self,
        vessels: &[VesselReport],
    ) -> Result<Vec<Collision>, ApiError> {
        self.client.detect_collisions(vessels).await
    }

    async fn chokepoint_ships(
        &self,
        chokepoints: &[Chokepoint],
    ) -> Result<ChokepointShipsResponse, ApiError> {
        self.client.chokepoint_ships(chokepoints).await
    }

    async fn weather(&self, at: LatLon) -> Result<Weather, ApiError> {
        self.client.weather(at).await
    }

    async fn vessels_in_area(
        &self,
        area: &VesselArea,
        limit: u32,
    ) -> Result<VesselsResponse, ApiError> {
        self.client.vessels_in_area(area, limit).await
    }

    async fn disasters_in_area(
        &self,
        area: AreaBounds,
    ) -> Result<DisastersInAreaResponse, ApiError> {
        self.client.disasters_in_area(area).await
    }

    async fn eca_mpa_in_area(&self, area: AreaBounds) -> Result<EcaMpaInAreaResponse, ApiError> {
        self.client.eca_mpa_in_area(area).await
    }
}
