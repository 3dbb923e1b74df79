use tracing::{debug, info, instrument, warn};

use crate::api::{AreaBounds, Backend, Chokepoint, Collision, Ship, VesselArea, VesselReport};
use crate::error::{Result, SeachartError};
use crate::geo::LatLon;
use crate::overlay::{DetailPanel, MapSurface, OverlayKind, Rgb};
use crate::panels;

use super::alerts::plural;
use super::populate::push_ships;
use super::{Alert, MapController};

/// Area and vessels of the current tracking session
#[derive(Debug, Default)]
pub(super) struct TrackingState {
    pub(super) area: Option<AreaBounds>,
    pub(super) vessels: Vec<Ship>,
}

/// Outcome of an area query against the tracked region
#[derive(Debug, Clone, Default)]
pub struct AreaReport {
    pub found: usize,
    pub alerts: Vec<Alert>,
}

fn not_ready(message: &str) -> SeachartError {
    SeachartError::NotReady(message.to_string())
}

impl<S: MapSurface> MapController<S> {
    pub fn tracked_area(&self) -> Option<AreaBounds> {
        self.tracking.read().area
    }

    pub fn tracked_vessel_count(&self) -> usize {
        self.tracking.read().vessels.len()
    }

    /// Kinematic reports of tracked vessels that are under way
    pub fn moving_vessels(&self) -> Vec<VesselReport> {
        self.tracking
            .read()
            .vessels
            .iter()
            .filter_map(Ship::vessel_report)
            .filter(|report| report.speed_kmh > 0.0)
            .collect()
    }

    /// Start a tracking session: replace every overlay with the vessels in `area`.
    ///
    /// Returns the number of vessels drawn, or `None` when superseded.
    #[instrument(skip(self, backend))]
    pub async fn load_vessels<B>(
        &self,
        backend: &B,
        area: &VesselArea,
        limit: u32,
    ) -> Result<Option<usize>>
    where
        B: Backend + ?Sized,
    {
        let generation = self.reset();

        let response = match backend.vessels_in_area(area, limit).await {
            Ok(response) => response,
            Err(e) if self.is_current(generation) => {
                warn!(error = %e, "Vessel lookup failed");
                return Err(e.into());
            }
            Err(_) => return Ok(None),
        };

        let fallback = match area {
            VesselArea::Viewport(bounds) | VesselArea::Custom(bounds) => Some(*bounds),
            VesselArea::Region(_) => None,
        };
        let tracked_area = response.bounds.or(fallback);

        let drawn = self.with_current(generation, |registry, bounds| {
            let drawn = push_ships(
                registry,
                OverlayKind::Ships,
                &response.vessels,
                Rgb::SHIP,
                bounds,
            );
            let mut tracking = self.tracking.write();
            tracking.area = tracked_area;
            tracking.vessels = response.vessels.clone();
            drawn
        });

        if let Some(drawn) = drawn {
            info!(vessels = response.vessels.len(), drawn, "Loaded vessels");
        }
        Ok(drawn)
    }

    /// Draw the disasters inside the tracked area
    #[instrument(skip(self, backend))]
    pub async fn check_disasters_in_area<B>(&self, backend: &B) -> Result<Option<AreaReport>>
    where
        B: Backend + ?Sized,
    {
        let area = self
            .tracked_area()
            .ok_or_else(|| not_ready("Load vessels first to set the region"))?;
        let generation = self.generation();

        let response = backend.disasters_in_area(area).await?;
        if !self.is_current(generation) {
            return Ok(None);
        }

        self.clear_groups(generation, &[OverlayKind::Disasters]);
        let found = self.add_disasters(generation, &response.disasters);

        let mut report = AreaReport {
            found,
            alerts: Vec::new(),
        };
        if found == 0 {
            report
                .alerts
                .push(Alert::info("No Disasters", "No active disasters in this area"));
            return Ok(Some(report));
        }

        let affected: usize = response
            .ships
            .iter()
            .flat_map(|areas| areas.values())
            .map(|area| area.ships.len())
            .sum();
        report.alerts.push(Alert::danger(
            "Disasters Found",
            format!("{found} disaster{} in the tracked area", plural(found)),
        ));
        if affected > 0 {
            report.alerts.push(Alert::warning(
                "Ships at Risk",
                format!("{affected} vessel{} inside disaster areas", plural(affected)),
            ));
        }
        Ok(Some(report))
    }

    /// Draw the ECA/MPA zones inside the tracked area
    #[instrument(skip(self, backend))]
    pub async fn check_protected_areas_in_area<B>(&self, backend: &B) -> Result<Option<AreaReport>>
    where
        B: Backend + ?Sized,
    {
        let area = self
            .tracked_area()
            .ok_or_else(|| not_ready("Load vessels first to set the region"))?;
        if self.tracked_vessel_count() == 0 {
            return Err(not_ready("No vessels loaded"));
        }
        let generation = self.generation();

        let response = backend.eca_mpa_in_area(area).await?;
        if !self.is_current(generation) {
            return Ok(None);
        }

        self.clear_groups(generation, &[OverlayKind::ProtectedAreas]);
        let found = response
            .eca_mpa
            .as_ref()
            .map(|areas| self.add_protected_areas(generation, areas))
            .unwrap_or(0);

        let alert = if found == 0 {
            Alert::info("No Protected Areas", "No ECA/MPA zones in this area")
        } else {
            Alert::warning(
                "Protected Areas",
                format!("{found} ECA/MPA zone{} in the tracked area", plural(found)),
            )
        };
        Ok(Some(AreaReport {
            found,
            alerts: vec![alert],
        }))
    }

    /// Run collision detection over the tracked vessels that are under way
    #[instrument(skip(self, backend))]
    pub async fn detect_collisions<B>(&self, backend: &B) -> Result<Option<Vec<Collision>>>
    where
        B: Backend + ?Sized,
    {
        let vessels = self.moving_vessels();
        if vessels.len() < 2 {
            return Err(not_ready("Need at least 2 moving vessels for collision detection"));
        }
        let generation = self.generation();
        debug!(vessels = vessels.len(), "Detecting collisions");

        let collisions = backend.detect_collisions(&vessels).await?;
        if !self.is_current(generation) {
            return Ok(None);
        }
        self.draw_collisions(generation, &collisions);
        Ok(Some(collisions))
    }

    /// Circle the chokepoints and draw the ships found inside them
    #[instrument(skip(self, backend, chokepoints), fields(count = chokepoints.len()))]
    pub async fn show_chokepoints<B>(
        &self,
        backend: &B,
        chokepoints: &[Chokepoint],
    ) -> Result<Option<usize>>
    where
        B: Backend + ?Sized,
    {
        if chokepoints.is_empty() {
            return Err(not_ready("No chokepoints on the current route"));
        }
        let generation = self.generation();

        let ships = backend.chokepoint_ships(chokepoints).await?;
        if !self.is_current(generation) {
            return Ok(None);
        }
        Ok(Some(self.draw_chokepoints(generation, chokepoints, &ships)))
    }

    /// Weather at a point, as a detail panel
    #[instrument(skip(self, backend))]
    pub async fn weather<B>(&self, backend: &B, at: LatLon) -> Result<DetailPanel>
    where
        B: Backend + ?Sized,
    {
        let weather = backend.weather(at).await?;
        Ok(panels::weather(&weather, at))
    }
}
