use std::collections::BTreeMap;

use tracing::debug;

use crate::api::{
    Chokepoint, ChokepointShipsResponse, Collision, Disaster, DisasterShips, FeatureCollection,
    PiracyData, PortInfo, RouteInfo, Ship,
};
use crate::geo::{normalize, normalize_all, Bounds, LatLon};
use crate::overlay::{Drawable, MapSurface, OverlayKind, OverlayRegistry, Rgb};
use crate::panels;

use super::{Generation, MapController};

/// Radius of the area watched around a chokepoint
const CHOKEPOINT_RADIUS_KM: f64 = 80.0;

fn at(point: LatLon, bounds: Option<&Bounds>) -> LatLon {
    normalize(point.lat, point.lon, bounds)
}

fn ship_drawable(ship: &Ship, color: Rgb, bounds: Option<&Bounds>) -> Option<Drawable> {
    let position = ship.position()?;
    Some(
        Drawable::marker(at(position, bounds), color, ship.display_name())
            .with_detail(panels::ship(ship)),
    )
}

/// Add ships as markers, skipping those without a position
pub(super) fn push_ships<S: MapSurface>(
    registry: &mut OverlayRegistry<S>,
    kind: OverlayKind,
    ships: &[Ship],
    color: Rgb,
    bounds: Option<&Bounds>,
) -> usize {
    let mut added = 0;
    for ship in ships {
        match ship_drawable(ship, color, bounds) {
            Some(drawable) => {
                registry.add_drawable(kind, drawable);
                added += 1;
            }
            None => debug!(ship = ship.display_name(), "Skipping ship without position"),
        }
    }
    added
}

impl<S: MapSurface> MapController<S> {
    /// Draw the route line from origin through the route geometry to destination
    pub fn draw_route(
        &self,
        generation: Generation,
        route: &RouteInfo,
        origin: Option<&PortInfo>,
        destination: Option<&PortInfo>,
    ) -> bool {
        self.with_current(generation, |registry, bounds| {
            let start = origin.and_then(PortInfo::position).map(|p| at(p, bounds));
            let end = destination.and_then(PortInfo::position).map(|p| at(p, bounds));

            let points: Vec<LatLon> = start
                .into_iter()
                .chain(route.path())
                .chain(end)
                .collect();
            if points.len() < 2 {
                debug!("Route has fewer than two points");
                return false;
            }
            let line = Drawable::polyline(points, Rgb::ROUTE, "Route");
            registry.add_drawable(OverlayKind::Route, line)
        })
        .unwrap_or(false)
    }

    pub fn add_ports(
        &self,
        generation: Generation,
        origin: Option<&PortInfo>,
        destination: Option<&PortInfo>,
    ) -> usize {
        self.with_current(generation, |registry, bounds| {
            let ports = [(origin, true, Rgb::ORIGIN), (destination, false, Rgb::DESTINATION)];
            let mut added = 0;
            for (port, is_origin, color) in ports {
                let Some(port) = port else { continue };
                let Some(position) = port.position() else {
                    debug!(port = port.display_name(), "Skipping port without position");
                    continue;
                };
                let marker = Drawable::marker(at(position, bounds), color, port.display_name())
                    .with_detail(panels::port(port, is_origin));
                registry.add_drawable(OverlayKind::Ports, marker);
                added += 1;
            }
            added
        })
        .unwrap_or(0)
    }

    /// Disaster markers plus their bounding boxes; returns the number of markers
    pub fn add_disasters(&self, generation: Generation, disasters: &[Disaster]) -> usize {
        self.with_current(generation, |registry, bounds| {
            let mut added = 0;
            for disaster in disasters {
                let Some(position) = disaster.position() else {
                    debug!(title = disaster.display_title(), "Skipping disaster without position");
                    continue;
                };
                let color = Rgb::for_alert_level(disaster.alert_level.as_deref());

                let marker = Drawable::marker(at(position, bounds), color, disaster.display_title())
                    .with_detail(panels::disaster(disaster));
                registry.add_drawable(OverlayKind::Disasters, marker);
                added += 1;

                if let Some((sw, ne)) = disaster.bbox.as_ref().and_then(|b| b.corners()) {
                    // Corners are normalized independently; near the antimeridian
                    // the quad may self-intersect.
                    let sw = at(sw, bounds);
                    let ne = at(ne, bounds);
                    let quad = vec![
                        LatLon::new(sw.lat, sw.lon),
                        LatLon::new(sw.lat, ne.lon),
                        LatLon::new(ne.lat, ne.lon),
                        LatLon::new(ne.lat, sw.lon),
                    ];
                    let area = Drawable::polygon(quad, color, disaster.display_title())
                        .with_detail(panels::disaster_area(disaster));
                    registry.add_drawable(OverlayKind::Disasters, area);
                }
            }
            added
        })
        .unwrap_or(0)
    }

    /// Ships reported inside disaster areas
    pub fn add_disaster_ships(
        &self,
        generation: Generation,
        ships: &BTreeMap<String, DisasterShips>,
    ) -> usize {
        self.with_current(generation, |registry, bounds| {
            ships
                .values()
                .map(|area| {
                    push_ships(registry, OverlayKind::Ships, &area.ships, Rgb::SHIP, bounds)
                })
                .sum::<usize>()
        })
        .unwrap_or(0)
    }

    /// Ships around a port, red when the port is congested
    pub fn add_port_ships(&self, generation: Generation, port: &PortInfo) -> usize {
        let Some(congestion) = &port.congestion else {
            return 0;
        };
        let color = if congestion.congested {
            Rgb::CONGESTED
        } else {
            Rgb::SHIP
        };
        self.with_current(generation, |registry, bounds| {
            push_ships(registry, OverlayKind::PortShips, &congestion.ships, color, bounds)
        })
        .unwrap_or(0)
    }

    /// ECA/MPA zones as polygons; returns the number of features drawn
    pub fn add_protected_areas(&self, generation: Generation, areas: &FeatureCollection) -> usize {
        self.with_current(generation, |registry, bounds| {
            let mut drawn = 0;
            for feature in &areas.features {
                let Some(geometry) = &feature.geometry else {
                    continue;
                };
                let properties = &feature.properties;
                let color = match properties.area_type.as_deref() {
                    Some("MPA") => Rgb::MPA,
                    _ => Rgb::ECA,
                };
                let label = properties.clean_name().unwrap_or_else(|| "Protected area".to_string());

                let mut any = false;
                for ring in geometry.outer_rings() {
                    if ring.len() < 3 {
                        continue;
                    }
                    let polygon =
                        Drawable::polygon(normalize_all(ring, bounds), color, label.clone())
                            .with_detail(panels::protected_area(properties));
                    registry.add_drawable(OverlayKind::ProtectedAreas, polygon);
                    any = true;
                }
                if any {
                    drawn += 1;
                } else {
                    debug!(
                        name = %label,
                        kind = %geometry.kind,
                        "Skipping feature without polygon rings"
                    );
                }
            }
            drawn
        })
        .unwrap_or(0)
    }

    pub fn add_piracy(&self, generation: Generation, piracy: &PiracyData) -> usize {
        self.with_current(generation, |registry, bounds| {
            let mut added = 0;
            for incident in &piracy.incidents {
                let Some(position) = incident.position() else {
                    continue;
                };
                let label = incident.incident_type.clone().unwrap_or_else(|| "Piracy".to_string());
                let marker = Drawable::marker(at(position, bounds), Rgb::PIRACY, label)
                    .with_detail(panels::piracy(incident));
                registry.add_drawable(OverlayKind::Piracy, marker);
                added += 1;
            }
            added
        })
        .unwrap_or(0)
    }

    /// Replace the collision group with lines between critical vessel pairs.
    ///
    /// Returns the number of lines drawn.
    pub fn draw_collisions(&self, generation: Generation, collisions: &[Collision]) -> usize {
        self.with_current(generation, |registry, bounds| {
            registry.clear_group(OverlayKind::Collisions);

            let mut drawn = 0;
            for collision in collisions.iter().filter(|c| c.is_critical()) {
                let a = at(collision.vessel_a.position(), bounds);
                let b = at(collision.vessel_b.position(), bounds);
                let label = format!(
                    "{} / {}",
                    collision.vessel_a.display_name(),
                    collision.vessel_b.display_name()
                );
                let line = Drawable::polyline(vec![a, b], Rgb::COLLISION, label)
                    .with_detail(panels::collision(collision));
                registry.add_drawable(OverlayKind::Collisions, line);
                drawn += 1;
            }
            debug!(total = collisions.len(), drawn, "Drew collisions");
            drawn
        })
        .unwrap_or(0)
    }

    /// Replace chokepoint circles and the ships found inside them
    pub fn draw_chokepoints(
        &self,
        generation: Generation,
        chokepoints: &[Chokepoint],
        ships: &ChokepointShipsResponse,
    ) -> usize {
        self.with_current(generation, |registry, bounds| {
            registry.clear_group(OverlayKind::Chokepoints);
            registry.clear_group(OverlayKind::ChokepointShips);

            let mut ship_total = 0;
            for chokepoint in chokepoints {
                let inside = ships.ships.get(&chokepoint.name).map(Vec::as_slice).unwrap_or(&[]);
                let center = at(LatLon::new(chokepoint.lat, chokepoint.lon), bounds);
                let detail = panels::chokepoint(chokepoint, inside.len());

                let circle = Drawable::circle(
                    center,
                    CHOKEPOINT_RADIUS_KM,
                    Rgb::CHOKEPOINT,
                    chokepoint.name.clone(),
                )
                .with_detail(detail.clone());
                registry.add_drawable(OverlayKind::Chokepoints, circle);

                let marker = Drawable::marker(center, Rgb::CHOKEPOINT, chokepoint.name.clone())
                    .with_detail(detail);
                registry.add_drawable(OverlayKind::Chokepoints, marker);

                ship_total += push_ships(
                    registry,
                    OverlayKind::ChokepointShips,
                    inside,
                    Rgb::SHIP,
                    bounds,
                );
            }
            ship_total
        })
        .unwrap_or(0)
    }
}
