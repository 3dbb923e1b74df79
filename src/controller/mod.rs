//! Map layer coordination.
//!
//! The controller owns the overlay registry, the reference bounds used for
//! longitude normalization and a generation counter. Every mutation is made
//! under the registry lock after checking that the request which produced
//! the data still belongs to the current generation, so a slow response
//! from a superseded route can never draw over a newer one.

mod alerts;
mod collisions;
mod populate;
mod tracking;

pub use alerts::{Alert, AlertLevel, RouteSummary};
pub use collisions::CollisionAggregate;
pub use tracking::AreaReport;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::api::{Backend, PortInfo, RouteResponse};
use crate::error::Result;
use crate::geo::Bounds;
use crate::overlay::{Drawable, LayerSurface, MapSurface, OverlayKind, OverlayRegistry};

use alerts::plural;
use tracking::TrackingState;

/// One round of requests; data from an older round is dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

pub struct MapController<S: MapSurface> {
    registry: Mutex<OverlayRegistry<S>>,
    bounds: RwLock<Option<Bounds>>,
    generation: AtomicU64,
    tracking: RwLock<TrackingState>,
}

impl<S: MapSurface> MapController<S> {
    pub fn new(surface: S) -> Self {
        Self::with_hidden(surface, &[])
    }

    pub fn with_hidden(surface: S, hidden: &[OverlayKind]) -> Self {
        Self {
            registry: Mutex::new(OverlayRegistry::with_hidden(surface, hidden)),
            bounds: RwLock::new(None),
            generation: AtomicU64::new(0),
            tracking: RwLock::new(TrackingState::default()),
        }
    }

    pub fn generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation() == generation
    }

    /// Start a new generation with every group empty and no reference bounds
    pub fn reset(&self) -> Generation {
        let mut registry = self.registry.lock();
        let generation = Generation(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        registry.clear_all();
        *self.bounds.write() = None;
        *self.tracking.write() = TrackingState::default();
        debug!(?generation, "Reset map state");
        generation
    }

    /// Reference bounds of the current route, if any
    pub fn bounds(&self) -> Option<Bounds> {
        *self.bounds.read()
    }

    /// Region the map should show: the route bounds, else the tracked area
    pub fn viewport(&self) -> Option<Bounds> {
        self.bounds()
            .or_else(|| self.tracked_area().map(|area| area.to_bounds()))
    }

    /// Run `f` on the registry if `generation` is still current.
    ///
    /// The generation check and the mutation happen under one lock, and the
    /// bounds are read at call time.
    fn with_current<R>(
        &self,
        generation: Generation,
        f: impl FnOnce(&mut OverlayRegistry<S>, Option<&Bounds>) -> R,
    ) -> Option<R> {
        let mut registry = self.registry.lock();
        if !self.is_current(generation) {
            debug!(?generation, current = ?self.generation(), "Dropping stale update");
            return None;
        }
        let bounds = self.bounds();
        Some(f(&mut registry, bounds.as_ref()))
    }

    fn set_bounds(&self, generation: Generation, bounds: Option<Bounds>) -> bool {
        self.with_current(generation, |_, _| {
            *self.bounds.write() = bounds;
        })
        .is_some()
    }

    pub(crate) fn clear_groups(&self, generation: Generation, kinds: &[OverlayKind]) {
        self.with_current(generation, |registry, _| {
            for kind in kinds {
                registry.clear_group(*kind);
            }
        });
    }

    /// Show or hide a group; its drawables are kept either way
    pub fn set_visible(&self, kind: OverlayKind, visible: bool) {
        self.registry.lock().set_visible(kind, visible);
    }

    /// Flip a group's visibility, returning the new state
    pub fn toggle(&self, kind: OverlayKind) -> bool {
        self.registry.lock().toggle(kind)
    }

    pub fn is_visible(&self, kind: OverlayKind) -> bool {
        self.registry.lock().is_visible(kind)
    }

    pub fn group_len(&self, kind: OverlayKind) -> usize {
        self.registry.lock().len(kind)
    }

    /// Read access to the registry; keep `f` short, it runs under the lock
    pub fn with_registry<R>(&self, f: impl FnOnce(&OverlayRegistry<S>) -> R) -> R {
        f(&self.registry.lock())
    }

    /// Recalculate the route between two ports and redraw every overlay.
    ///
    /// All groups are cleared and the bounds dropped before the request is
    /// sent. Returns `None` when a newer calculation started meanwhile.
    #[instrument(skip(self, backend))]
    pub async fn calculate_route<B>(
        &self,
        backend: &B,
        origin: &str,
        destination: &str,
    ) -> Result<Option<RouteSummary>>
    where
        B: Backend + ?Sized,
    {
        let generation = self.reset();
        info!(?generation, "Calculating route");

        match backend.route(origin, destination).await {
            Ok(response) => Ok(self.apply_route(generation, &response)),
            Err(e) if self.is_current(generation) => {
                warn!(error = %e, "Route request failed");
                Err(e.into())
            }
            Err(e) => {
                debug!(error = %e, "Ignoring failure of superseded route");
                Ok(None)
            }
        }
    }

    /// Draw a route response; returns `None` when `generation` is stale
    pub fn apply_route(
        &self,
        generation: Generation,
        response: &RouteResponse,
    ) -> Option<RouteSummary> {
        let route = response.route.as_ref();
        let origin = response.origin.as_ref();
        let destination = response.destination.as_ref();

        let bounds = route
            .and_then(|r| Bounds::from_path(r.path()))
            .or_else(|| {
                Bounds::from_path(
                    origin
                        .and_then(PortInfo::position)
                        .into_iter()
                        .chain(destination.and_then(PortInfo::position)),
                )
            });
        if !self.set_bounds(generation, bounds) {
            return None;
        }
        debug!(?bounds, "Set reference bounds");

        let mut summary = RouteSummary::new(generation);
        summary.origin = origin.map(|p| p.display_name().to_string());
        summary.destination = destination.map(|p| p.display_name().to_string());

        if let Some(route) = route {
            self.draw_route(generation, route, origin, destination);
            summary.length = route.length;
            summary.units = route.units.clone();
            summary.chokepoints = route.chokepoints.clone();
        }
        self.add_ports(generation, origin, destination);

        self.populate_disasters(generation, response, &mut summary);
        self.populate_ships(generation, response, &mut summary);

        if let Some(areas) = &response.eca_mpa_data {
            if self.add_protected_areas(generation, areas) > 0 {
                summary.alerts.push(Alert::warning(
                    "ECA/MPA Alert",
                    "Route passes through regulated environmental areas",
                ));
            }
        }

        if let Some(piracy) = &response.piracy {
            let count = self.add_piracy(generation, piracy);
            if count > 0 {
                summary.alerts.push(Alert::danger(
                    "Piracy Alert",
                    format!("{count} incident{} detected (last 5 months)", plural(count)),
                ));
            }
            if let Some(total) = piracy.current_month_total.filter(|t| *t > 0) {
                summary
                    .alerts
                    .push(Alert::warning("Current Month Piracy", format!("{total} incidents")));
            }
        }

        if response.enable_collision_check {
            if let Some(ships) = &response.ships {
                summary.collision_targets = ships.keys().cloned().collect();
            }
        }

        if !self.is_current(generation) {
            return None;
        }
        info!(
            length = ?summary.length,
            alerts = summary.alerts.len(),
            "Route drawn"
        );
        Some(summary)
    }

    fn populate_disasters(
        &self,
        generation: Generation,
        response: &RouteResponse,
        summary: &mut RouteSummary,
    ) {
        let near_ports = [
            (response.origin.as_ref(), "origin"),
            (response.destination.as_ref(), "destination"),
        ];
        for (port, which) in near_ports {
            let Some(port) = port else { continue };
            let count = self.add_disasters(generation, &port.disasters);
            if count > 0 {
                summary.alerts.push(Alert::danger(
                    "Disaster Alert",
                    format!("{count} disaster{} near {which} port", plural(count)),
                ));
            }
        }

        if let Some(route) = &response.route {
            let count = self.add_disasters(generation, &route.disasters);
            if count > 0 {
                summary.alerts.push(Alert::danger(
                    "Route Alert",
                    format!("{count} disaster{} along the route", plural(count)),
                ));
            }
        }
    }

    fn populate_ships(
        &self,
        generation: Generation,
        response: &RouteResponse,
        summary: &mut RouteSummary,
    ) {
        if let Some(ships) = &response.ships {
            let count = self.add_disaster_ships(generation, ships);
            summary.alerts.push(if count > 0 {
                Alert::warning(
                    "Ships Tracked",
                    format!("{count} vessel{} detected in disaster areas", plural(count)),
                )
            } else {
                Alert::info("No Ships Found", "No vessels detected in disaster areas")
            });
        }

        for port in [response.origin.as_ref(), response.destination.as_ref()]
            .into_iter()
            .flatten()
        {
            self.add_port_ships(generation, port);
            let Some(congestion) = port.congestion.as_ref().filter(|c| c.congested) else {
                continue;
            };
            let radius = congestion.radius_km.unwrap_or(0.0);
            summary.alerts.push(Alert::warning(
                "Port Congestion",
                format!(
                    "{} has {} ships within {radius:.0} km",
                    port.display_name(),
                    congestion.ship_count.unwrap_or(0)
                ),
            ));
        }
    }
}

impl MapController<LayerSurface> {
    /// Attached drawables, copied out for painting without holding the lock
    pub fn snapshot(&self) -> Vec<(OverlayKind, Arc<Drawable>)> {
        self.registry.lock().surface().snapshot()
    }
}
